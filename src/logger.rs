use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn init() {
    let tracing_subscriber = tracing_subscriber::registry();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // 单线程运行，不需要线程ID
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_owned()))
        .with_target(false);
    tracing_subscriber.with(filter).with(fmt).init();
}
