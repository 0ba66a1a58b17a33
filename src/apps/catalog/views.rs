//! Views for categories, genres, and titles.
//!
//! Categories and genres expose list/create/delete only (slug-keyed);
//! titles are full CRUD by id. All mutations are admin-gated, reads are
//! open.

use std::sync::Arc;

use super::models::{Category, Genre, Title};
use super::serializers::{LabelData, LabelOut, TitleData, TitleOut};
use crate::auth::permissions::{IsAdminOrReadOnly, Permission, PermissionContext};
use crate::exceptions::{ApiError, ApiResult};
use crate::http::{Request, Response};
use crate::pagination::{PageParams, Paginated};
use crate::state::AppState;

fn enforce_admin_or_read_only(request: &Request) -> ApiResult<()> {
	IsAdminOrReadOnly
		.check(&PermissionContext::from_request(request))
		.require()
}

/// The category and genre viewsets differ only in the model they touch;
/// this macro stamps out the list/create/delete trio for each.
macro_rules! label_views {
	($list:ident, $create:ident, $delete:ident, $model:ident, $slug_field:literal) => {
		pub async fn $list(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
			enforce_admin_or_read_only(&request)?;
			let page = PageParams::from_request(&request, &state.settings)?;
			let search = request.query_param("search");
			let (rows, count) = $model::list(&state.pool, search.as_deref(), page).await?;
			let results: Vec<LabelOut> = rows.iter().map(LabelOut::from).collect();
			Ok(Response::ok_json(&Paginated::new(
				results,
				count,
				page,
				request.uri.path(),
			)))
		}

		pub async fn $create(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
			enforce_admin_or_read_only(&request)?;
			let data: LabelData = request.json()?;
			data.validate()?;
			let row = $model::create(&state.pool, &data.name, &data.slug)
				.await
				.map_err(crate::db::map_unique_violation($slug_field))?;
			Ok(Response::created_json(&LabelOut::from(&row)))
		}

		pub async fn $delete(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
			enforce_admin_or_read_only(&request)?;
			let slug = request.param("slug").ok_or(ApiError::NotFound)?;
			if $model::delete_by_slug(&state.pool, slug).await? {
				Ok(Response::no_content())
			} else {
				Err(ApiError::NotFound)
			}
		}
	};
}

label_views!(list_categories, create_category, delete_category, Category, "slug");
label_views!(list_genres, create_genre, delete_genre, Genre, "slug");

/// `GET /api/v1/titles/`
pub async fn list_titles(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	enforce_admin_or_read_only(&request)?;
	let page = PageParams::from_request(&request, &state.settings)?;
	let search = request.query_param("search");
	let (titles, count) = Title::list(&state.pool, search.as_deref(), page).await?;
	let mut results = Vec::with_capacity(titles.len());
	for title in &titles {
		results.push(TitleOut::build(&state.pool, title).await?);
	}
	Ok(Response::ok_json(&Paginated::new(
		results,
		count,
		page,
		request.uri.path(),
	)))
}

/// `POST /api/v1/titles/` (admin)
pub async fn create_title(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	enforce_admin_or_read_only(&request)?;
	let data: TitleData = request.json()?;
	let validated = data.validate(&state.pool).await?;
	let title = Title::create(
		&state.pool,
		&validated.name,
		validated.year,
		validated.category_id,
		validated.genre_ids.as_deref().unwrap_or(&[]),
	)
	.await?;
	Ok(Response::created_json(
		&TitleOut::build(&state.pool, &title).await?,
	))
}

/// `GET /api/v1/titles/{title_id}/`
pub async fn retrieve_title(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	enforce_admin_or_read_only(&request)?;
	let title = find_title(&state, &request).await?;
	Ok(Response::ok_json(
		&TitleOut::build(&state.pool, &title).await?,
	))
}

/// `PATCH /api/v1/titles/{title_id}/` (admin)
pub async fn update_title(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	enforce_admin_or_read_only(&request)?;
	let title = find_title(&state, &request).await?;

	// Partial update: absent fields keep their stored values.
	let mut data: TitleData = request.json()?;
	if data.name.is_empty() {
		data.name = title.name.clone();
	}
	if data.year.is_none() {
		data.year = Some(title.year);
	}
	let validated = data.validate(&state.pool).await?;
	let category_id = if data.category.is_some() {
		validated.category_id
	} else {
		title.category_id
	};
	let updated = title
		.update(
			&state.pool,
			&validated.name,
			validated.year,
			category_id,
			validated.genre_ids.as_deref(),
		)
		.await?;
	Ok(Response::ok_json(
		&TitleOut::build(&state.pool, &updated).await?,
	))
}

/// `DELETE /api/v1/titles/{title_id}/` (admin)
pub async fn delete_title(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	enforce_admin_or_read_only(&request)?;
	let id = request.id_param("title_id")?;
	if Title::delete(&state.pool, id).await? {
		Ok(Response::no_content())
	} else {
		Err(ApiError::NotFound)
	}
}

async fn find_title(state: &AppState, request: &Request) -> ApiResult<Title> {
	let id = request.id_param("title_id")?;
	Title::find_by_id(&state.pool, id)
		.await?
		.ok_or(ApiError::NotFound)
}
