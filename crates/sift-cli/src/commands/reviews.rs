use serde_json::json;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift reviews`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let active = ctx.review_id().ok();
    let reviews = ctx
        .service
        .store()
        .list_projects()
        .await?
        .into_iter()
        .map(|project| {
            let is_active = active == Some(project.id.as_str());
            json!({
                "id": project.id,
                "name": project.name,
                "question": project.protocol.display_question(),
                "created_at": project.created_at,
                "active": is_active,
            })
        })
        .collect::<Vec<_>>();
    output(&reviews, flags.format)
}
