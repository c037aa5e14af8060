use axum::{Extension, response::Html};

use crate::{api::views, error::AppError, spotify::SpotifyClient};

pub async fn dashboard(
    Extension(client): Extension<SpotifyClient>,
) -> Result<Html<String>, AppError> {
    let user = client.current_user().await?;
    let name = user
        .display_name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "user".to_string());

    Ok(Html(views::dashboard_page(&name)))
}
