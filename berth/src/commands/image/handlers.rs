use super::*;
use crate::commands::{self, RegistryArgs};
use crate::context::AppContext;
use crate::format;

fn credentials_or_exit(registry: &RegistryArgs) -> Option<RegistryCredentials> {
    registry.credentials().unwrap_or_else(|e| format::fail(&e))
}

fn image_or_exit(reference: &str) -> ImageRef {
    reference
        .parse()
        .unwrap_or_else(|e: libberth::BerthError| format::fail(&e.to_string()))
}

/// Handle the search command
pub async fn handle_search(
    ctx: &AppContext,
    query: Option<&str>,
    limit: Option<usize>,
    registry: &RegistryArgs,
) {
    let credentials = credentials_or_exit(registry);
    let resolver = commands::resolver(ctx).unwrap_or_else(|e| format::fail(&e));

    let spinner = format::spinner("Searching images...");
    let result = search(
        resolver.as_ref(),
        query.unwrap_or_default(),
        limit,
        credentials.as_ref(),
    )
    .await;
    spinner.finish_and_clear();

    match result {
        Ok(list) => format::print_output(&list, ctx.format),
        Err(e) => format::fail(&e),
    }
}

/// Handle the tags command
pub async fn handle_tags(ctx: &AppContext, reference: &str, registry: &RegistryArgs) {
    let image = image_or_exit(reference);
    let credentials = credentials_or_exit(registry);
    let resolver = commands::resolver(ctx).unwrap_or_else(|e| format::fail(&e));

    let spinner = format::spinner(&format!("Listing tags for {}...", image.name()));
    let (list, notice) = tags(resolver.as_ref(), &image, credentials.as_ref()).await;
    spinner.finish_and_clear();

    if let Some(notice) = notice {
        format::notice(&notice);
    }
    format::print_output(&list, ctx.format);
}

/// Handle the inspect command
pub async fn handle_inspect(ctx: &AppContext, reference: &str, registry: &RegistryArgs) {
    let image = image_or_exit(reference);
    let credentials = credentials_or_exit(registry);
    let resolver = commands::resolver(ctx).unwrap_or_else(|e| format::fail(&e));

    let spinner = format::spinner(&format!("Inspecting {}...", image));
    let result = inspect(resolver.as_ref(), &image, credentials.as_ref()).await;
    spinner.finish_and_clear();

    match result {
        Ok(inspection) => format::print_output(&inspection, ctx.format),
        Err(e) => format::fail(&e),
    }
}
