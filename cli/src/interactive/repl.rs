//! Prompt loop: ask, answer, repeat until the user types exit

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use scout_core::Agent;
use std::io::Write;
use tracing::{debug, error};

/// Prompt shown before the first question
pub const FIRST_PROMPT: &str = "What do you like to ask?";

/// Prompt shown before every later question
pub const FOLLOW_UP_PROMPT: &str =
    "Do you have other queries you would like to know about? if not type exit to end the chat.";

/// Shown instead of the internal error when a question cannot be answered
pub const QUESTION_FAILURE: &str =
    "Sorry, something went wrong answering that. Please try again.";

/// Source of user input lines. `None` means the input is closed.
#[async_trait]
pub trait LineSource: Send {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Line editor backed by rustyline. Reads run on the blocking pool so the
/// runtime stays free while the user types.
pub struct EditorLineSource {
    editor: Option<DefaultEditor>,
}

impl EditorLineSource {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("Failed to initialise line editor")?;
        Ok(Self {
            editor: Some(editor),
        })
    }
}

#[async_trait]
impl LineSource for EditorLineSource {
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| anyhow!("Line editor is unavailable"))?;
        let prompt = format!("{}\n", prompt);

        let (editor, line) = tokio::task::spawn_blocking(move || {
            let line = editor.readline(&prompt);
            (editor, line)
        })
        .await
        .context("Line editor task failed")?;
        self.editor = Some(editor);

        match line {
            Ok(line) => {
                if let Some(editor) = self.editor.as_mut() {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(e).context("Failed to read input"),
        }
    }
}

/// True when the line asks to end the chat
pub fn is_exit_command(line: &str) -> bool {
    line.to_lowercase().contains("exit")
}

/// Run the chat until the user exits or input closes, then print the
/// remembered conversation.
pub async fn run_session<A, L, W>(agent: &mut A, lines: &mut L, out: &mut W) -> Result<()>
where
    A: Agent + ?Sized,
    L: LineSource + ?Sized,
    W: Write,
{
    let mut prompt = FIRST_PROMPT;

    while let Some(line) = lines.read_line(prompt).await? {
        if is_exit_command(&line) {
            debug!("Exit requested");
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        match agent.ask(question).await {
            Ok(execution) => {
                writeln!(out, "{}", execution.answer)?;
            }
            Err(e) => {
                error!("Question failed: {}", e);
                writeln!(out, "{}", QUESTION_FAILURE)?;
            }
        }
        writeln!(out)?;
        prompt = FOLLOW_UP_PROMPT;
    }

    let history = serde_json::to_string_pretty(&agent.memory().snapshot())
        .context("Failed to serialise conversation memory")?;
    writeln!(out, "{}", history)?;
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::agent::{Decider, Decision};
    use scout_core::config::{Protocol, ResolvedLlmConfig, ToolSettings};
    use scout_core::llm::{LlmMessage, ToolDefinition};
    use scout_core::tools::ToolRegistry;
    use scout_core::AgentBuilder;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedLines {
        lines: VecDeque<String>,
        prompts: Vec<String>,
    }

    impl ScriptedLines {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                prompts: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl LineSource for ScriptedLines {
        async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
            self.prompts.push(prompt.to_string());
            Ok(self.lines.pop_front())
        }
    }

    /// Answers every question with "answer N"
    struct CountingDecider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Decider for CountingDecider {
        async fn decide(
            &self,
            _messages: Vec<LlmMessage>,
            _tools: &[ToolDefinition],
        ) -> scout_core::Result<Decision> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Decision::FinalAnswer(format!("answer {}", n)))
        }
    }

    fn agent(decider: Arc<CountingDecider>) -> scout_core::AgentCore {
        let llm = ResolvedLlmConfig::new(
            Protocol::AzureOpenAI,
            "https://example.openai.azure.com".to_string(),
            "key".to_string(),
            "chat".to_string(),
        );
        AgentBuilder::new(llm, ToolSettings::default())
            .with_decider(decider)
            .with_tool_registry(ToolRegistry::new())
            .with_tools(vec![])
            .build()
            .unwrap()
    }

    #[test]
    fn test_exit_detection() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("Exit"));
        assert!(is_exit_command("  EXIT now"));
        assert!(is_exit_command("please exit the chat"));
        assert!(!is_exit_command("What time is it?"));
    }

    #[tokio::test]
    async fn test_session_answers_until_exit() {
        let decider = Arc::new(CountingDecider {
            calls: AtomicUsize::new(0),
        });
        let mut agent = agent(decider.clone());
        let mut lines = ScriptedLines::new(&["first question", "", "second question", "exit"]);
        let mut out = Vec::new();

        run_session(&mut agent, &mut lines, &mut out).await.unwrap();

        assert_eq!(decider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            lines.prompts,
            vec![FIRST_PROMPT, FOLLOW_UP_PROMPT, FOLLOW_UP_PROMPT, FOLLOW_UP_PROMPT]
        );

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("answer 1\n\nanswer 2\n\n"));

        let history_start = text.find('[').unwrap();
        let history: serde_json::Value = serde_json::from_str(&text[history_start..]).unwrap();
        let turns = history.as_array().unwrap();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[0]["content"], "first question");
        assert_eq!(turns[3]["role"], "assistant");
        assert_eq!(turns[3]["content"], "answer 2");
    }

    #[tokio::test]
    async fn test_exit_in_any_case_skips_agent() {
        let decider = Arc::new(CountingDecider {
            calls: AtomicUsize::new(0),
        });
        let mut agent = agent(decider.clone());
        let mut lines = ScriptedLines::new(&["Exit", "never asked"]);
        let mut out = Vec::new();

        run_session(&mut agent, &mut lines, &mut out).await.unwrap();

        assert_eq!(decider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(lines.prompts, vec![FIRST_PROMPT]);
        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }

    /// Agent whose every question fails with an internal error
    struct BrokenAgent {
        config: scout_core::AgentConfig,
        memory: scout_core::memory::MemoryWindow,
    }

    #[async_trait]
    impl Agent for BrokenAgent {
        async fn ask(
            &mut self,
            _question: &str,
        ) -> scout_core::Result<scout_core::AgentExecution> {
            Err(scout_core::Error::Generic("IO error: disk full".to_string()))
        }

        fn config(&self) -> &scout_core::AgentConfig {
            &self.config
        }

        fn agent_type(&self) -> &str {
            "broken"
        }

        fn memory(&self) -> &scout_core::memory::MemoryWindow {
            &self.memory
        }

        fn clear_memory(&mut self) {
            self.memory.clear();
        }

        fn set_trajectory_recorder(&mut self, _recorder: scout_core::TrajectoryRecorder) {}

        fn trajectory_recorder(&self) -> Option<&scout_core::TrajectoryRecorder> {
            None
        }
    }

    #[tokio::test]
    async fn test_internal_errors_are_not_shown() {
        let mut agent = BrokenAgent {
            config: scout_core::AgentConfig::default(),
            memory: scout_core::memory::MemoryWindow::new(8),
        };
        let mut lines = ScriptedLines::new(&["What time is it?", "exit"]);
        let mut out = Vec::new();

        run_session(&mut agent, &mut lines, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(QUESTION_FAILURE));
        assert!(!text.contains("disk full"));
    }

    #[tokio::test]
    async fn test_closed_input_ends_session() {
        let decider = Arc::new(CountingDecider {
            calls: AtomicUsize::new(0),
        });
        let mut agent = agent(decider.clone());
        let mut lines = ScriptedLines::new(&["only question"]);
        let mut out = Vec::new();

        run_session(&mut agent, &mut lines, &mut out).await.unwrap();

        assert_eq!(decider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(agent.memory().len(), 2);
    }
}
