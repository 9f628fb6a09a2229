use nr_inference::QuestionAnswerer;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

pub const PROMPT: &str = "Type your query about the news corpus (or type 'Exit' to quit):";

fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit")
}

/// Reads questions line by line until `exit` (any case) or end of input,
/// answering each one. A failed question is reported and the loop goes on.
///
/// Returns the number of questions answered.
pub async fn run_query_loop<A, R, W>(answerer: &A, mut input: R, mut output: W) -> std::io::Result<usize>
where
    A: QuestionAnswerer + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut answered = 0usize;

    loop {
        output.write_all(format!("{}\n", PROMPT).as_bytes()).await?;
        output.flush().await?;

        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            info!("input closed");
            break;
        }
        // invalid UTF-8 is replaced, never fatal
        let line = String::from_utf8_lossy(&buf);
        let query = line.trim();
        if is_exit(query) {
            break;
        }
        if query.is_empty() {
            continue;
        }

        match answerer.answer(query).await {
            Ok(answer) => {
                output.write_all(answer.as_bytes()).await?;
                output.write_all(b"\n").await?;
                answered += 1;
            }
            Err(e) => {
                error!(%query, error = %e, "query failed");
                output.write_all(format!("error: {}\n", e).as_bytes()).await?;
            }
        }
        output.flush().await?;
    }

    info!(answered, "👋 Leaving query loop");
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nr_core::{Error, Result};
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedAnswerer {
        questions: Mutex<Vec<String>>,
    }

    impl ScriptedAnswerer {
        fn questions(&self) -> Vec<String> {
            self.questions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QuestionAnswerer for ScriptedAnswerer {
        async fn answer(&self, question: &str) -> Result<String> {
            self.questions.lock().unwrap().push(question.to_string());
            if question.contains("break") {
                return Err(Error::Inference("model unavailable".to_string()));
            }
            Ok(format!("answer to {}", question))
        }
    }

    async fn run(input: &str) -> (ScriptedAnswerer, String, usize) {
        let answerer = ScriptedAnswerer::default();
        let mut output = Vec::new();
        let answered = run_query_loop(&answerer, input.as_bytes(), &mut output).await.unwrap();
        (answerer, String::from_utf8(output).unwrap(), answered)
    }

    #[tokio::test]
    async fn test_exit_in_any_case_stops_without_querying() {
        for sentinel in ["exit", "Exit", "EXIT", "  exit  "] {
            let (answerer, output, answered) = run(&format!("{}\nnever asked\n", sentinel)).await;
            assert!(answerer.questions().is_empty(), "sentinel {:?}", sentinel);
            assert_eq!(answered, 0);
            assert_eq!(output, format!("{}\n", PROMPT));
        }
    }

    #[tokio::test]
    async fn test_each_query_runs_one_cycle_before_next_prompt() {
        let (answerer, output, answered) = run("why are eggs expensive?\nwho reported it?\nexit\n").await;
        assert_eq!(answerer.questions(), vec!["why are eggs expensive?", "who reported it?"]);
        assert_eq!(answered, 2);
        assert_eq!(
            output,
            format!(
                "{p}\nanswer to why are eggs expensive?\n{p}\nanswer to who reported it?\n{p}\n",
                p = PROMPT
            )
        );
    }

    #[tokio::test]
    async fn test_failed_query_is_reported_and_loop_continues() {
        let (answerer, output, answered) = run("please break\nstill here?\nexit\n").await;
        assert_eq!(answerer.questions().len(), 2);
        assert_eq!(answered, 1);
        assert!(output.contains("error: Inference error: model unavailable\n"));
        assert!(output.contains("answer to still here?\n"));
    }

    #[tokio::test]
    async fn test_blank_lines_and_eof() {
        let (answerer, output, answered) = run("\n   \nlast question").await;
        assert_eq!(answerer.questions(), vec!["last question"]);
        assert_eq!(answered, 1);
        assert_eq!(output.matches(PROMPT).count(), 4);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_end_the_loop() {
        let answerer = ScriptedAnswerer::default();
        let mut output = Vec::new();
        let input: &[u8] = b"caf\xe9 prices\nwhy eggs?\nexit\n";
        let answered = run_query_loop(&answerer, input, &mut output).await.unwrap();

        assert_eq!(answered, 2);
        assert_eq!(answerer.questions(), vec!["caf\u{FFFD} prices", "why eggs?"]);
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("answer to why eggs?\n"));
        assert_eq!(output.matches(PROMPT).count(), 3);
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let (answerer, _, answered) = run("egg supply?\r\nExit\r\n").await;
        assert_eq!(answerer.questions(), vec!["egg supply?"]);
        assert_eq!(answered, 1);
    }

    #[test]
    fn test_is_exit() {
        assert!(is_exit("eXiT"));
        assert!(!is_exit("exit now"));
        assert!(!is_exit("quit"));
    }
}
