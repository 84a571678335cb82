use std::net::SocketAddr;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::mpsc,
};

use super::*;
use crate::foundation::error::ErrorKind;

/// One-route HTTP server answering every request with `status` and `body`.
/// Each received request (head and body) is forwarded on the returned channel.
async fn serve(status: u16, body: &'static str) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let len = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if buf.len() >= head_end + 4 + len {
                        break;
                    }
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
            let response = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
        }
    });
    (addr, rx)
}

fn enhancer(addr: SocketAddr, key: Option<&str>) -> ChatEnhancer {
    let cfg = ChatConfig {
        base_url: format!("http://{addr}/v1/"),
        model: "narrator-small".to_string(),
        api_key: key.map(str::to_string),
        api_key_env: "SCENEREEL_TEST_UNSET_KEY".to_string(),
        timeout_secs: 5,
        ..ChatConfig::default()
    };
    ChatEnhancer::from_config(&cfg).unwrap()
}

const OK: &str = r#"{"choices":[{"message":{"role":"assistant","content":"  \"Install the CLI with cargo.\"\n"}}]}"#;

#[tokio::test]
async fn enhance_posts_chat_request_and_cleans_reply() {
    let (addr, mut requests) = serve(200, OK).await;
    let e = enhancer(addr, Some("sk-test"));

    let text = e
        .enhance("here we install the cli", SceneType::Command)
        .await
        .unwrap();
    assert_eq!(text, "Install the CLI with cargo.");

    let req = requests.recv().await.unwrap();
    assert!(req.starts_with("POST /v1/chat/completions "), "{req}");
    assert!(req.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    assert!(req.contains("\"model\":\"narrator-small\""));
    assert!(req.contains("terminal commands being shown"));
    assert!(req.contains("here we install the cli"));
}

#[tokio::test]
async fn translate_names_both_languages() {
    let (addr, mut requests) = serve(200, OK).await;
    let e = enhancer(addr, Some("sk-test"));

    e.translate("Welcome to the course.", "en", "es").await.unwrap();
    let req = requests.recv().await.unwrap();
    assert!(req.contains("from 'en' to 'es'"));
    assert!(req.contains("Welcome to the course."));
}

#[tokio::test]
async fn http_error_is_unavailable_with_service_message() {
    let (addr, _requests) = serve(429, r#"{"error":{"message":"rate limited","type":"rate"}}"#).await;
    let err = enhancer(addr, Some("sk-test"))
        .enhance("Hello", SceneType::Title)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CollaboratorUnavailable);
    assert!(err.to_string().contains("rate limited"), "{err}");
}

#[tokio::test]
async fn empty_choices_are_unavailable() {
    let (addr, _requests) = serve(200, r#"{"choices":[]}"#).await;
    let err = enhancer(addr, Some("sk-test"))
        .enhance("Hello", SceneType::Title)
        .await
        .unwrap_err();
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn missing_key_and_refused_connection_are_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let no_key = enhancer(addr, None).enhance("Hi", SceneType::Outro).await.unwrap_err();
    assert!(no_key.to_string().contains("no API key"));

    let refused = enhancer(addr, Some("sk-test"))
        .translate("Hi", "en", "fr")
        .await
        .unwrap_err();
    assert_eq!(refused.kind(), ErrorKind::CollaboratorUnavailable);
}

#[test]
fn prompts_follow_scene_type() {
    let title = enhance_prompt("Intro", SceneType::Title);
    assert!(title.contains("8 to 20 words"));
    assert!(title.contains("opening title slide"));
    assert!(title.contains("revolutionary"));
    let quiz = enhance_prompt("Q", SceneType::Quiz);
    assert!(quiz.contains("multiple-choice"));
    assert_eq!(clean_completion("  \"hi\"  "), "hi");
    assert_eq!(clean_completion("plain"), "plain");
}
