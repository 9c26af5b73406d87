pub mod http;
pub mod stdio;

/// Build the multi-threaded runtime both transports run on.
fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}
