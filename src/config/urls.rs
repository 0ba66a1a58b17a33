//! Top-level URL configuration: every app registers its routes here.

use std::sync::Arc;

use crate::apps::{catalog, reviews, users};
use crate::routing::Router;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
	let mut router = Router::new(state);
	users::urls::register(&mut router);
	reviews::urls::register(&mut router);
	catalog::urls::register(&mut router);
	router
}
