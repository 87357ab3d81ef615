//! Drives a real listener over TCP.

use std::sync::Arc;

use allergex_nlp::{Engine, Lexicon, RuleAnnotator, SentimentLabel};
use allergex_server::{read_frame, serve, write_frame, Response};
use pretty_assertions::assert_eq;
use tokio::net::{TcpListener, TcpStream};

async fn start_server(max_frame_bytes: usize) -> std::net::SocketAddr {
    let lexicon = Lexicon::new(
        vec!["maple tree".to_string()],
        vec!["pollen".to_string()],
        vec!["safe".to_string()],
        vec!["allergic".to_string(), "avoid".to_string()],
    );
    let engine = Arc::new(Engine::new(lexicon, Arc::new(RuleAnnotator::new())).await.unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, engine, max_frame_bytes));
    addr
}

async fn request(stream: &mut TcpStream, text: &str) -> Response {
    write_frame(stream, text).await.unwrap();
    let reply = read_frame(stream, 1 << 20).await.unwrap().expect("reply frame");
    serde_json::from_str(&reply).unwrap()
}

#[tokio::test]
async fn test_multiple_requests_per_connection() {
    let addr = start_server(1 << 20).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    match request(&mut stream, "The maple tree releases pollen people avoid.").await {
        Response::Ok { records } => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].species_name, "maple tree");
            assert_eq!(records[0].sentiment, SentimentLabel::Negative);
        }
        other => panic!("unexpected response {:?}", other),
    }

    match request(&mut stream, "Pollen before the maple tree.").await {
        Response::Ok { records } => assert!(records.is_empty()),
        other => panic!("unexpected response {:?}", other),
    }
}

#[tokio::test]
async fn test_long_message_is_not_truncated() {
    let addr = start_server(1 << 20).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let filler = "nothing to see here ".repeat(500);
    let text = format!("{filler}The maple tree sheds pollen.");
    match request(&mut stream, &text).await {
        Response::Ok { records } => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].allergen_char_start, filler.len() + 21);
        }
        other => panic!("unexpected response {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_clients() {
    let addr = start_server(1 << 20).await;

    let clients: Vec<_> = (0..6)
        .map(|_| {
            tokio::spawn(async move {
                let mut stream = TcpStream::connect(addr).await.unwrap();
                request(&mut stream, "A maple tree, and pollen is safe.").await
            })
        })
        .collect();

    for client in clients {
        match client.await.unwrap() {
            Response::Ok { records } => assert_eq!(records[0].sentiment, SentimentLabel::Positive),
            other => panic!("unexpected response {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_oversized_frame_closes_only_that_session() {
    let addr = start_server(32).await;

    let mut greedy = TcpStream::connect(addr).await.unwrap();
    write_frame(&mut greedy, "this message is longer than thirty-two bytes").await.unwrap();
    assert_eq!(read_frame(&mut greedy, 1 << 20).await.ok().flatten(), None);

    // 17 bytes, under the limit
    let mut polite = TcpStream::connect(addr).await.unwrap();
    match request(&mut polite, "maple tree pollen").await {
        Response::Ok { records } => assert_eq!(records.len(), 1),
        other => panic!("unexpected response {:?}", other),
    }
}

/// Fails on any text mentioning "boom", otherwise defers to the rule annotator.
struct FlakyAnnotator;

#[async_trait::async_trait]
impl allergex_nlp::Annotator for FlakyAnnotator {
    async fn annotate(&self, text: &str) -> allergex_nlp::Result<Vec<allergex_nlp::Token>> {
        if text.contains("boom") {
            return Err(allergex_nlp::NlpError::Annotator("service exploded".to_string()));
        }
        Ok(RuleAnnotator::new().tokenize(text))
    }
}

#[tokio::test]
async fn test_processing_error_answers_and_keeps_session() {
    use allergex_server::handle_connection;

    let lexicon = Lexicon::new(
        vec!["birch".to_string()],
        vec!["pollen".to_string()],
        vec![],
        vec![],
    );
    let engine = Engine::new(lexicon, Arc::new(FlakyAnnotator)).await.unwrap();

    let (mut client, server) = tokio::io::duplex(1024);
    let (mut server_read, mut server_write) = tokio::io::split(server);
    let peer: std::net::SocketAddr = "127.0.0.1:4000".parse().unwrap();

    let session = async {
        handle_connection(&mut server_read, &mut server_write, &engine, 1024, peer)
            .await
            .unwrap();
    };
    let conversation = async move {
        write_frame(&mut client, "boom pollen").await.unwrap();
        let first: Response =
            serde_json::from_str(&read_frame(&mut client, 1024).await.unwrap().unwrap()).unwrap();

        write_frame(&mut client, "birch pollen").await.unwrap();
        let second: Response =
            serde_json::from_str(&read_frame(&mut client, 1024).await.unwrap().unwrap()).unwrap();

        drop(client);
        (first, second)
    };

    let ((), (first, second)) = tokio::join!(session, conversation);

    match first {
        Response::Error { message } => assert!(message.contains("service exploded")),
        other => panic!("expected error response, got {:?}", other),
    }
    match second {
        Response::Ok { records } => assert_eq!(records.len(), 1),
        other => panic!("unexpected response {:?}", other),
    }
}
