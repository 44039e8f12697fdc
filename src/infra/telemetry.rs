use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::feed::METRIC_HOME_COMPOSE_MS;
use crate::application::placement::{
    METRIC_PLACEMENT_CASCADE_FAILURES, METRIC_PLACEMENT_DEMOTIONS,
};
use crate::cache::{METRIC_HOME_CACHE_HIT, METRIC_HOME_CACHE_INVALIDATE, METRIC_HOME_CACHE_MISS};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_HOME_CACHE_HIT,
            Unit::Count,
            "Total number of home feed requests served from the cache."
        );
        describe_counter!(
            METRIC_HOME_CACHE_MISS,
            Unit::Count,
            "Total number of home feed requests that recomposed the feed."
        );
        describe_counter!(
            METRIC_HOME_CACHE_INVALIDATE,
            Unit::Count,
            "Total number of home feed cache invalidations."
        );
        describe_counter!(
            METRIC_PLACEMENT_DEMOTIONS,
            Unit::Count,
            "Total number of cascading demotions applied, labelled by target position."
        );
        describe_counter!(
            METRIC_PLACEMENT_CASCADE_FAILURES,
            Unit::Count,
            "Total number of cascade steps that failed, labelled by stage."
        );
        describe_histogram!(
            METRIC_HOME_COMPOSE_MS,
            Unit::Milliseconds,
            "Home feed composition latency in milliseconds."
        );
    });
}
