use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║        Listing Tool Server (Search, Booking, Calendar)     ║");
    println!("╚════════════════════════════════════════════════════════════╝\n");

    let port = std::env::var("LISTING_SERVER_PORT")
        .unwrap_or_else(|_| "8002".to_string())
        .parse::<u16>()?;
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("✓ Listing tool server running on http://0.0.0.0:{}", port);
    println!("  GET  /tools                        - List all tools");
    println!("  POST /tools/search-listings        - Search listings");
    println!("  POST /tools/book-listing           - Book a listing");
    println!("  POST /tools/create-calendar-event  - Create a calendar event\n");

    axum::serve(listener, listing_server::router()).await?;

    Ok(())
}
