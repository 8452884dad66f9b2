use crate::config::SolhmrConfig;
use crate::error::{Result, ResultExt};
use solhmr::{Pipeline, SubscriberSlot};
use std::sync::Arc;

/// Wire the pipeline described by `config`.
pub(crate) fn build_pipeline(config: &SolhmrConfig) -> Result<Pipeline> {
    let layout = config.layout();
    let resolver = config
        .resolver()
        .context("Failed to create block explorer client")?;
    let builder = config.build_command()?;

    tracing::debug!(
        "project {}, build command `{}`",
        layout.project_dir.display(),
        builder.display()
    );

    Ok(Pipeline::new(
        layout,
        Arc::new(resolver),
        Arc::new(builder),
        Arc::new(SubscriberSlot::new()),
    ))
}
