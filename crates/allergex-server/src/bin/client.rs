//! Interactive client: sends each stdin line to the server and prints the
//! reply. Type `exit` to quit.

use allergex_config::Settings;
use allergex_server::{read_frame, write_frame, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load()?;
    info!("Connecting to {}", settings.address());
    let mut stream = TcpStream::connect(settings.address()).await?;
    let (mut reader, mut writer) = stream.split();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout
            .write_all(b"Enter a string to send to the server (or 'exit' to quit): ")
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("exit") {
            println!("Exiting...");
            break;
        }

        write_frame(&mut writer, &line).await?;
        println!("Sent to server: {line}");

        let Some(reply) = read_frame(&mut reader, settings.max_frame_bytes).await? else {
            println!("Server closed the connection");
            break;
        };
        match serde_json::from_str::<Response>(&reply)? {
            Response::Ok { records } if records.is_empty() => println!("Received: no associations"),
            Response::Ok { records } => {
                for record in records {
                    println!("Received: {record}");
                }
            }
            Response::Error { message } => println!("Server error: {message}"),
        }
    }

    Ok(())
}
