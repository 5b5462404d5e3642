//! `reasonflow replay`: feed a recording through the engine.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::config::ReconcileConfig;
use crate::error::{FlowError, Result};
use crate::reconcile::reconcile;
use crate::sink::SseSink;
use crate::source::jsonl::read_fragments;
use crate::source::sse::decode_chat_completion_sse;
use crate::source::FragmentStream;
use crate::types::Fragment;

use super::{InputFormat, ReplayArgs};

/// Build the effective config: file and environment, then CLI flags.
pub fn resolve_config(args: &ReplayArgs) -> Result<ReconcileConfig> {
    let mut config = ReconcileConfig::load(args.config.as_deref())?;
    if args.no_reasoning {
        config.reasoning_enabled = false;
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(secs) = args.initial_timeout {
        config.initial_timeout = flag_duration("--initial-timeout", secs)?;
    }
    if let Some(secs) = args.gap_timeout {
        config.inter_fragment_timeout = flag_duration("--gap-timeout", secs)?;
    }
    config.validate()?;
    Ok(config)
}

fn flag_duration(flag: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| FlowError::InvalidArgument(format!("{flag}: invalid duration {secs}")))
}

/// Release fragments one by one with a fixed pause in front of each.
pub fn paced(fragments: Vec<Fragment>, delay: Duration) -> FragmentStream {
    if delay.is_zero() {
        return crate::source::from_fragments(fragments);
    }
    stream::iter(fragments)
        .then(move |fragment| async move {
            tokio::time::sleep(delay).await;
            Ok::<_, FlowError>(fragment)
        })
        .boxed()
}

pub async fn handle_replay(args: ReplayArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let source = match args.format {
        InputFormat::Jsonl => paced(
            read_fragments(&args.file)?,
            Duration::from_millis(args.delay_ms),
        ),
        InputFormat::Sse => {
            let body = tokio::fs::read(&args.file).await?;
            decode_chat_completion_sse(stream::iter([Ok::<_, FlowError>(body)]))
        }
    };

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut sink = SseSink::new(std::io::stdout());
    let result = reconcile(source, &mut sink, &config, &cancel).await;

    eprintln!("outcome:   {}", result.outcome);
    eprintln!("answer:    {} bytes", result.answer.len());
    eprintln!("reasoning: {} bytes", result.thinking.content.len());
    if let Some(elapsed) = result.thinking.elapsed {
        eprintln!("thinking:  {:.3}s", elapsed.as_secs_f64());
    }
    if result.is_retryable() {
        eprintln!("retryable: yes");
    }
    Ok(())
}
