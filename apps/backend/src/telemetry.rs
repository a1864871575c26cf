use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info,actix_web=info,sqlx=warn,sea_orm=warn";

/// One JSON object per event, carrying the fields of the current span.
fn json_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .json()
        .with_current_span(true)
        .with_writer(writer)
}

/// Install the global subscriber for the server and the retention binary.
///
/// `RUST_LOG` overrides the filter. Output is JSON unless `LOG_FORMAT=pretty`.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let pretty = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("pretty"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if pretty {
        registry.with(fmt::layer().with_target(false)).init();
    } else {
        registry.with(json_layer(std::io::stdout)).init();
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn json_lines_include_the_request_span() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::registry().with(json_layer(move || writer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("request", trace_id = "trace-1");
            let _entered = span.enter();
            tracing::info!(job = "cleanup", "cleanup finished");
        });

        let bytes = captured.0.lock().unwrap().clone();
        let out = String::from_utf8(bytes).unwrap();
        let line: serde_json::Value = serde_json::from_str(out.lines().last().unwrap()).unwrap();
        assert_eq!(line["level"], "INFO");
        assert_eq!(line["fields"]["message"], "cleanup finished");
        assert_eq!(line["fields"]["job"], "cleanup");
        assert_eq!(line["span"]["name"], "request");
        assert_eq!(line["span"]["trace_id"], "trace-1");
    }
}
