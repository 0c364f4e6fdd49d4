use once_cell::sync::Lazy;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

static GLIB_LOGGER: glib::GlibLogger =
    glib::GlibLogger::new(glib::GlibLoggerFormat::Plain, glib::GlibLoggerDomain::CrateTarget);

/// Routes the `log` macros into GLib's log handler.
pub fn init_logging() {
    if log::set_logger(&GLIB_LOGGER).is_ok() {
        let level = if std::env::var_os("SHAKWA_DEBUG").is_some() {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        log::set_max_level(level);
    }
}

pub fn spawn_async<F>(fut: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut)
}

/// Runs `fut` on the Tokio runtime; the result is awaited back on the GTK main loop.
pub fn run_async_to_main<T, Fut>(fut: Fut) -> oneshot::Receiver<T>
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    spawn_async(async move {
        let _ = tx.send(fut.await);
    });
    rx
}

/// Like `run_async_to_main`, then hands the result to `on_done` on the main loop.
pub fn spawn_to_main<T, Fut, F>(fut: Fut, on_done: F)
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    F: FnOnce(T) + 'static,
{
    let rx = run_async_to_main(fut);
    glib::spawn_future_local(async move {
        if let Ok(res) = rx.await {
            on_done(res);
        }
    });
}

/// Repeats `job` every `every`, first run immediately. Dropping the handle stops it.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn_poll<T, Fut, J>(every: Duration, mut job: J, results: mpsc::UnboundedSender<T>) -> PollHandle
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
    J: FnMut() -> Fut + Send + 'static,
{
    let task = spawn_async(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if results.send(job().await).is_err() {
                break;
            }
        }
    });
    PollHandle { task }
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
