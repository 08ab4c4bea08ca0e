use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::core::config::MapConfig;
use crate::features::map_token::{MapTokenProvider, TokenSource, TokenState};
use crate::features::selection::filter::filter;
use crate::features::selection::{Intent, SelectionStateController, Transition};
use crate::features::territories::models::{CanvasPoint, GeoPoint};
use crate::features::territories::services::{CoordinateProjector, GeoDataRepository};
use crate::features::views::{
    ListView, MapView, PolygonMapView, RenderContext, TileMapView, ViewAdapter, ViewOutput,
};
use crate::shared::templates::TemplateError;

/// Inputs of the last render; views are rebuilt only when one changes
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderKey {
    revision: u64,
    token: TokenState,
    search: Option<String>,
}

/// One client's synchronized views: a single controller, a token provider
/// and the three adapters rendering from them.
#[derive(Debug)]
pub struct ViewSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    repo: Arc<GeoDataRepository>,
    projector: Arc<CoordinateProjector>,
    controller: SelectionStateController,
    token: MapTokenProvider,
    views: Vec<ViewAdapter>,
    search: Option<String>,
    last_active: Instant,
    rendered_for: Option<RenderKey>,
    outputs: Vec<ViewOutput>,
}

impl ViewSession {
    /// Must be called within a tokio runtime: the token request starts
    /// immediately since every session shows the tile map.
    pub fn new(
        repo: Arc<GeoDataRepository>,
        projector: Arc<CoordinateProjector>,
        token_source: Arc<dyn TokenSource>,
        map: &MapConfig,
    ) -> Self {
        let token = MapTokenProvider::new(token_source);
        token.ensure_started();

        Self {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            controller: SelectionStateController::new(repo.clone()),
            repo,
            projector,
            token,
            views: vec![
                ViewAdapter::PolygonMap(PolygonMapView),
                ViewAdapter::TileMap(TileMapView::from_config(map)),
                ViewAdapter::List(ListView),
            ],
            search: None,
            last_active: Instant::now(),
            rendered_for: None,
            outputs: Vec::new(),
        }
    }

    pub fn controller(&self) -> &SelectionStateController {
        &self.controller
    }

    pub fn token_state(&self) -> TokenState {
        self.token.state()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> std::time::Duration {
        self.last_active.elapsed()
    }

    pub fn dispatch(&mut self, intent: Intent) -> Transition {
        self.touch();
        self.controller.dispatch(intent)
    }

    /// Resolve a polygon map click to an intent and apply it. A click on
    /// empty canvas does nothing.
    pub fn canvas_click(&mut self, point: CanvasPoint) -> Transition {
        self.touch();
        let intent = self.with_context(|ctx| {
            self.views.iter().find_map(|view| match view {
                ViewAdapter::PolygonMap(polygon) => polygon.hit_test(ctx, point),
                _ => None,
            })
        });

        match intent {
            Some(intent) => self.controller.dispatch(intent),
            None => Transition::Unchanged,
        }
    }

    /// Resolve the pointer position on the polygon map to a hover change
    pub fn canvas_hover(&mut self, point: CanvasPoint) -> Transition {
        self.touch();
        let intent = self.with_context(|ctx| {
            self.views.iter().find_map(|view| match view {
                ViewAdapter::PolygonMap(polygon) => Some(polygon.hover_test(ctx, point)),
                _ => None,
            })
        });

        match intent {
            Some(intent) => self.controller.dispatch(intent),
            None => Transition::Unchanged,
        }
    }

    /// Resolve a tile map click to the nearest marker and select it
    pub fn map_click(&mut self, at: GeoPoint) -> Transition {
        self.touch();
        let intent = self.with_context(|ctx| {
            self.views.iter().find_map(|view| match view {
                ViewAdapter::TileMap(tile) => tile.pick(ctx, at),
                _ => None,
            })
        });

        match intent {
            Some(intent) => self.controller.dispatch(intent),
            None => Transition::Unchanged,
        }
    }

    pub fn set_search(&mut self, term: Option<String>) {
        self.touch();
        self.search = term
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
    }

    /// User-initiated token retry
    pub fn reload_token(&mut self) -> bool {
        self.touch();
        self.token.reload()
    }

    pub fn teardown(&self) {
        self.token.teardown();
    }

    /// Current output of every view, rebuilt only when selection, token or
    /// search changed since the last call.
    pub fn render(&mut self) -> &[ViewOutput] {
        let key = RenderKey {
            revision: self.controller.revision(),
            token: self.token.state(),
            search: self.search.clone(),
        };

        if self.rendered_for.as_ref() != Some(&key) {
            let departments = filter(self.repo.all_departments(), self.controller.state());
            let ctx = RenderContext {
                repo: &self.repo,
                projector: &self.projector,
                state: self.controller.state(),
                departments: &departments,
                token: &key.token,
                search: self.search.as_deref(),
            };

            self.outputs = self.views.iter_mut().map(|view| view.render(&ctx)).collect();
            tracing::debug!(
                "Session {} rendered {:?} at revision {}",
                self.id,
                self.views.iter().map(|view| view.kind()).collect::<Vec<_>>(),
                key.revision
            );
            self.rendered_for = Some(key);
        }

        &self.outputs
    }

    /// SVG document of the polygon map
    pub fn polygon_svg(&self) -> Option<Result<String, TemplateError>> {
        self.with_context(|ctx| {
            self.views.iter().find_map(|view| match view {
                ViewAdapter::PolygonMap(polygon) => Some(polygon.svg(ctx)),
                _ => None,
            })
        })
    }

    fn with_context<R>(&self, f: impl FnOnce(&RenderContext<'_>) -> R) -> R {
        let departments = filter(self.repo.all_departments(), self.controller.state());
        let token = self.token.state();
        f(&RenderContext {
            repo: &self.repo,
            projector: &self.projector,
            state: self.controller.state(),
            departments: &departments,
            token: &token,
            search: self.search.as_deref(),
        })
    }

    #[cfg(test)]
    pub fn tile_initializations(&self) -> u32 {
        self.views
            .iter()
            .find_map(|view| match view {
                ViewAdapter::TileMap(tile) => Some(tile.initializations()),
                _ => None,
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::territories::models::EntityKind;
    use crate::shared::test_helpers::{embedded_projector, embedded_repository, StubTokenSource};
    use std::time::Duration;

    fn map_config() -> MapConfig {
        MapConfig {
            access_token: None,
            token_url: "http://127.0.0.1:3000/api/map/token".to_string(),
            tile_url_template: "https://tiles.example.test/{z}/{x}/{y}.png?access_token={token}"
                .to_string(),
            token_timeout: Duration::from_secs(5),
            default_zoom: 6,
        }
    }

    fn session(source: Arc<StubTokenSource>) -> ViewSession {
        let repo = embedded_repository();
        let projector = embedded_projector(&repo);
        ViewSession::new(repo, projector, source, &map_config())
    }

    async fn wait_for_token(session: &ViewSession) {
        let mut rx = session.token.subscribe();
        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| matches!(s, TokenState::Ready(_) | TokenState::Error(_))),
        )
        .await
        .expect("token settles")
        .expect("provider alive");
    }

    fn tile_status(outputs: &[ViewOutput]) -> String {
        let views = serde_json::to_value(outputs).unwrap();
        views
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["view"] == "tileMap")
            .map(|v| v["status"].as_str().unwrap().to_string())
            .unwrap()
    }

    #[tokio::test]
    async fn test_tile_view_initializes_once_across_renders() {
        let source = StubTokenSource::ready("abc123");
        let mut session = session(source.clone());

        assert_eq!(session.token_state(), TokenState::Loading);
        assert_eq!(tile_status(session.render()), "pending");

        wait_for_token(&session).await;
        assert_eq!(tile_status(session.render()), "ready");

        session.dispatch(Intent::SelectProvince {
            id: "estuaire".to_string(),
        });
        session.render();
        session.dispatch(Intent::Hover {
            kind: EntityKind::Department,
            id: "komo".to_string(),
        });
        session.render();
        session.set_search(Some("komo".to_string()));
        session.render();

        assert_eq!(session.tile_initializations(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_token_error_needs_reload() {
        let source = StubTokenSource::scripted(vec![
            Err(crate::features::map_token::TokenError::EmptyToken),
            Ok("abc123".to_string()),
        ]);
        let mut session = session(source.clone());

        wait_for_token(&session).await;
        assert_eq!(tile_status(session.render()), "unavailable");
        assert_eq!(source.calls(), 1);

        assert!(session.reload_token());
        wait_for_token(&session).await;
        assert_eq!(tile_status(session.render()), "ready");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_all_views_render_same_selection() {
        let mut session = session(StubTokenSource::ready("abc123"));
        wait_for_token(&session).await;
        session.dispatch(Intent::SelectDepartment {
            id: "komo-ocean".to_string(),
        });

        let views = serde_json::to_value(session.render()).unwrap();
        let views = views.as_array().unwrap();
        assert_eq!(views.len(), 3);

        let polygon = &views[0];
        let selected: Vec<&str> = polygon["markers"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|m| m["highlight"] == "selected")
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        assert_eq!(selected, vec!["komo-ocean"]);

        let tile = &views[1];
        let selected: Vec<&str> = tile["markers"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|m| m["highlight"] == "selected")
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        assert_eq!(selected, vec!["komo-ocean"]);

        let list = &views[2];
        let selected: Vec<&str> = list["cards"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|c| c["selected"] == true)
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(selected, vec!["komo-ocean"]);
    }

    #[tokio::test]
    async fn test_gestures_resolve_to_intents() {
        let mut session = session(StubTokenSource::ready("abc123"));

        assert_eq!(
            session.canvas_click(CanvasPoint::new(595.0, 5.0)),
            Transition::Unchanged
        );
        assert_eq!(
            session.canvas_click(CanvasPoint::new(152.0, 226.5)),
            Transition::Changed
        );
        assert_eq!(
            session.controller().state().selected_province_id.as_deref(),
            Some("estuaire")
        );

        // Tile picks need an initialized surface
        wait_for_token(&session).await;
        assert_eq!(
            session.map_click(GeoPoint::new(9.55, -0.33)),
            Transition::Unchanged
        );
        session.render();
        assert_eq!(
            session.map_click(GeoPoint::new(9.55, -0.33)),
            Transition::Changed
        );
        assert_eq!(session.controller().navigation_target(), Some("komo-ocean"));
    }

    #[tokio::test]
    async fn test_canvas_hover_follows_pointer() {
        let mut session = session(StubTokenSource::ready("abc123"));

        assert_eq!(
            session.canvas_hover(CanvasPoint::new(498.0, 409.3)),
            Transition::Changed
        );
        assert!(session
            .controller()
            .state()
            .is_hovered(EntityKind::Province, "haut-ogooue"));
        assert_eq!(session.controller().state().selected_province_id, None);

        // Same shape again
        assert_eq!(
            session.canvas_hover(CanvasPoint::new(498.0, 409.3)),
            Transition::Unchanged
        );

        assert_eq!(
            session.canvas_hover(CanvasPoint::new(595.0, 5.0)),
            Transition::Changed
        );
        assert_eq!(session.controller().state().hovered, None);
    }

    #[tokio::test]
    async fn test_map_click_ignored_after_failed_reload() {
        let source = StubTokenSource::scripted(vec![
            Ok("abc123".to_string()),
            Err(crate::features::map_token::TokenError::EmptyToken),
        ]);
        let mut session = session(source.clone());
        wait_for_token(&session).await;
        assert_eq!(tile_status(session.render()), "ready");

        assert!(session.reload_token());
        wait_for_token(&session).await;
        assert_eq!(tile_status(session.render()), "unavailable");

        assert_eq!(
            session.map_click(GeoPoint::new(9.55, -0.33)),
            Transition::Unchanged
        );
        assert_eq!(session.controller().navigation_target(), None);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_map_click_ignored_without_token() {
        let mut session = session(StubTokenSource::failing("connection refused"));
        wait_for_token(&session).await;
        assert_eq!(tile_status(session.render()), "unavailable");

        assert_eq!(
            session.map_click(GeoPoint::new(9.55, -0.33)),
            Transition::Unchanged
        );
        assert_eq!(session.tile_initializations(), 0);
    }

    #[tokio::test]
    async fn test_teardown_freezes_pending_token() {
        let source = StubTokenSource::pending();
        let mut session = session(source.clone());
        tokio::task::yield_now().await;

        session.teardown();
        source.release();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(session.token_state(), TokenState::Loading);
        assert!(!session.reload_token());
    }

    #[tokio::test]
    async fn test_polygon_svg_and_search() {
        let mut session = session(StubTokenSource::ready("abc123"));
        session.set_search(Some("   ".to_string()));
        assert_eq!(session.search(), None);
        session.set_search(Some(" lope ".to_string()));
        assert_eq!(session.search(), Some("lope"));

        let svg = session.polygon_svg().unwrap().unwrap();
        assert!(svg.contains("Estuaire"));
    }
}
