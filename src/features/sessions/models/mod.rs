mod view_session;

pub use view_session::ViewSession;
