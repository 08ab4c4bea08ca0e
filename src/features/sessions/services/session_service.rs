use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::core::config::{MapConfig, SessionConfig};
use crate::core::error::{AppError, Result};
use crate::features::map_token::dto::TokenStatusDto;
use crate::features::map_token::TokenSource;
use crate::features::selection::{Intent, Transition};
use crate::features::sessions::dtos::{CreateSessionDto, SessionCommandDto, SessionSnapshotDto};
use crate::features::sessions::models::ViewSession;
use crate::features::territories::models::{CanvasPoint, GeoPoint};
use crate::features::territories::services::{CoordinateProjector, GeoDataRepository};

/// Outcome of a command: the resulting snapshot, plus the warning of a
/// rejected intent.
#[derive(Debug)]
pub struct CommandOutcome {
    pub snapshot: SessionSnapshotDto,
    pub warning: Option<String>,
}

/// Service owning the live view sessions
pub struct SessionService {
    repo: Arc<GeoDataRepository>,
    projector: Arc<CoordinateProjector>,
    token_source: Arc<dyn TokenSource>,
    map: MapConfig,
    config: SessionConfig,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<ViewSession>>>>,
}

impl SessionService {
    pub fn new(
        repo: Arc<GeoDataRepository>,
        projector: Arc<CoordinateProjector>,
        token_source: Arc<dyn TokenSource>,
        map: MapConfig,
        config: SessionConfig,
    ) -> Self {
        Self {
            repo,
            projector,
            token_source,
            map,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Open a session, applying the deep link of `dto` if any
    pub async fn create(&self, dto: CreateSessionDto) -> Result<CommandOutcome> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.config.max_sessions {
            return Err(AppError::ServiceUnavailable(format!(
                "Session limit of {} reached",
                self.config.max_sessions
            )));
        }

        let mut session = ViewSession::new(
            self.repo.clone(),
            self.projector.clone(),
            self.token_source.clone(),
            &self.map,
        );

        let deep_link = match (dto.department_id, dto.province_id) {
            (Some(id), _) => Some(Intent::SelectDepartment { id }),
            (None, Some(id)) => Some(Intent::SelectProvince { id }),
            (None, None) => None,
        };
        let warning = deep_link.and_then(|intent| session.dispatch(intent).warning());
        session.set_search(dto.search);

        let id = session.id;
        let snapshot = Self::snapshot(&mut session);
        sessions.insert(id, Arc::new(Mutex::new(session)));

        tracing::info!("Opened view session {} ({} live)", id, sessions.len());
        Ok(CommandOutcome { snapshot, warning })
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionSnapshotDto> {
        let session = self.find(id).await?;
        let mut session = session.lock().await;
        session.touch();
        Ok(Self::snapshot(&mut session))
    }

    /// Apply one command under the session lock
    pub async fn apply(&self, id: Uuid, command: SessionCommandDto) -> Result<CommandOutcome> {
        let session = self.find(id).await?;
        let mut session = session.lock().await;

        let transition = match command.intent() {
            Some(intent) => session.dispatch(intent),
            None => match command {
                SessionCommandDto::CanvasClick(click) => {
                    session.canvas_click(CanvasPoint::new(click.x, click.y))
                }
                SessionCommandDto::CanvasHover(at) => {
                    session.canvas_hover(CanvasPoint::new(at.x, at.y))
                }
                SessionCommandDto::MapClick(click) => {
                    session.map_click(GeoPoint::new(click.lng, click.lat))
                }
                SessionCommandDto::Search(search) => {
                    session.set_search(search.term);
                    Transition::Unchanged
                }
                _ => Transition::Unchanged,
            },
        };

        if transition == Transition::Changed {
            tracing::debug!(
                "Session {} moved to {} (revision {})",
                id,
                session.controller().phase().name(),
                session.controller().revision()
            );
        }

        Ok(CommandOutcome {
            warning: transition.warning(),
            snapshot: Self::snapshot(&mut session),
        })
    }

    /// User-initiated retry of the map token. Returns whether a request
    /// was issued; a request already in flight is left alone.
    pub async fn reload_token(&self, id: Uuid) -> Result<(SessionSnapshotDto, bool)> {
        let session = self.find(id).await?;
        let mut session = session.lock().await;
        let started = session.reload_token();
        Ok((Self::snapshot(&mut session), started))
    }

    pub async fn polygon_svg(&self, id: Uuid) -> Result<String> {
        let session = self.find(id).await?;
        let mut session = session.lock().await;
        session.touch();
        match session.polygon_svg() {
            Some(svg) => Ok(svg?),
            None => Err(AppError::NotFound("Polygon map is not part of this session".to_string())),
        }
    }

    /// Close a session; its pending token request is cancelled
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let removed = self.sessions.write().await.remove(&id);
        let Some(session) = removed else {
            tracing::warn!("Cannot close unknown session {}", id);
            return Err(AppError::NotFound(format!("Session {} not found", id)));
        };

        session.lock().await.teardown();
        tracing::info!("Closed view session {}", id);
        Ok(())
    }

    /// Drop sessions idle for longer than the configured timeout.
    /// Sessions busy with a command are kept.
    pub async fn sweep_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let timeout = self.config.idle_timeout;

        let expired: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, session)| {
                session
                    .try_lock()
                    .map(|s| s.idle_for() >= timeout)
                    .unwrap_or(false)
            })
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            if let Some(session) = sessions.remove(id) {
                if let Ok(session) = session.try_lock() {
                    session.teardown();
                }
            }
        }

        if !expired.is_empty() {
            tracing::info!(
                "Reaped {} idle session(s), {} live",
                expired.len(),
                sessions.len()
            );
        }
        expired.len()
    }

    async fn find(&self, id: Uuid) -> Result<Arc<Mutex<ViewSession>>> {
        self.sessions.read().await.get(&id).cloned().ok_or_else(|| {
            tracing::warn!("Unknown session {}", id);
            AppError::NotFound(format!("Session {} not found", id))
        })
    }

    fn snapshot(session: &mut ViewSession) -> SessionSnapshotDto {
        let token = TokenStatusDto::from(&session.token_state());
        let views = session.render().to_vec();
        let controller = session.controller();
        let navigation_target = controller.navigation_target().map(str::to_string);

        SessionSnapshotDto {
            id: session.id,
            revision: controller.revision(),
            phase: controller.phase().name().to_string(),
            state: controller.state().clone(),
            navigation_path: navigation_target
                .as_ref()
                .map(|id| format!("/departements/{}", id)),
            navigation_target,
            token,
            search: session.search().map(str::to_string),
            created_at: session.created_at,
            views,
        }
    }
}
