//! Process-backed pipeline
//!
//! Runs one pipeline as a child process. The child's output is copied to the
//! console byte for byte and mirrored to tracing at debug level. Both pipes are
//! drained until EOF whatever they contain, so the child never sees a closed
//! pipe while the runner waits for exit.

use std::process::Stdio;
use std::time::Instant;

use contracts::{ContractError, Pipeline, PipelineCommand};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Where child output goes besides the debug log mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Copy stdout/stderr to this process's stdout/stderr
    #[default]
    Console,
    /// Log mirror only
    Quiet,
}

/// Output stream of the child process
#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

type OutputSink = Box<dyn AsyncWrite + Unpin + Send>;

/// Pipeline launched as an external command
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    name: String,
    command: PipelineCommand,
    output: OutputMode,
}

impl CommandPipeline {
    /// Create a pipeline from its launch command
    pub fn new(name: impl Into<String>, command: PipelineCommand) -> Self {
        Self {
            name: name.into(),
            command,
            output: OutputMode::default(),
        }
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn command(&self) -> &PipelineCommand {
        &self.command
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args)
            .envs(&self.command.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.command.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    fn sinks(&self) -> (OutputSink, OutputSink) {
        match self.output {
            OutputMode::Console => (Box::new(tokio::io::stdout()), Box::new(tokio::io::stderr())),
            OutputMode::Quiet => (Box::new(tokio::io::sink()), Box::new(tokio::io::sink())),
        }
    }
}

impl Pipeline for CommandPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "pipeline_run", skip(self), fields(pipeline = %self.name))]
    async fn run(&self) -> Result<(), ContractError> {
        debug!(command = %self.command.display(), "spawning pipeline process");
        let start = Instant::now();

        let mut child = self
            .build_command()
            .spawn()
            .map_err(|e| ContractError::pipeline_spawn(&self.name, e.to_string()))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (stdout_sink, stderr_sink) = self.sinks();

        // Drain both pipes while waiting so a chatty child never blocks on a full pipe
        let (_, _, status) = tokio::join!(
            forward_output(&self.name, stdout, stdout_sink, Stream::Stdout),
            forward_output(&self.name, stderr, stderr_sink, Stream::Stderr),
            child.wait(),
        );

        let status = status
            .map_err(|e| ContractError::pipeline_spawn(&self.name, format!("wait failed: {e}")))?;

        if !status.success() {
            warn!(
                code = ?status.code(),
                duration_secs = start.elapsed().as_secs_f64(),
                "pipeline process failed"
            );
            return Err(ContractError::pipeline_failed(&self.name, status.code()));
        }

        info!(
            duration_secs = start.elapsed().as_secs_f64(),
            "pipeline process finished"
        );
        Ok(())
    }
}

/// Copy one child stream to `sink` line by line until EOF
///
/// Lines are raw bytes; the log mirror decodes them lossily. A failing sink
/// stops the echo but not the draining.
async fn forward_output<R, W>(pipeline: &str, reader: Option<R>, mut sink: W, stream: Stream)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut echo = true;

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(pipeline, stream = stream.as_str(), error = %e, "reading pipeline output failed");
                break;
            }
        }

        if echo {
            if let Err(e) = write_line(&mut sink, &line).await {
                debug!(pipeline, stream = stream.as_str(), error = %e, "console echo disabled");
                echo = false;
            }
        }

        let text = String::from_utf8_lossy(&line);
        debug!(
            pipeline,
            stream = stream.as_str(),
            "{}",
            text.trim_end_matches(['\r', '\n'])
        );
    }
}

async fn write_line<W: AsyncWrite + Unpin>(sink: &mut W, line: &[u8]) -> std::io::Result<()> {
    sink.write_all(line).await?;
    sink.flush().await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> PipelineCommand {
        PipelineCommand::new("sh", ["-c", script])
    }

    #[tokio::test]
    async fn test_successful_command() {
        let pipeline = CommandPipeline::new("ok", sh("echo hello; echo oops >&2"));
        assert!(pipeline.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_exit_code_is_reported() {
        let pipeline = CommandPipeline::new("failing", sh("exit 3"));
        let err = pipeline.run().await.unwrap_err();
        match err {
            ContractError::PipelineFailed { pipeline, code } => {
                assert_eq!(pipeline, "failing");
                assert_eq!(code, Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let pipeline = CommandPipeline::new(
            "missing",
            PipelineCommand::new("definitely-not-a-real-program-xyz", Vec::<String>::new()),
        );
        let err = pipeline.run().await.unwrap_err();
        assert!(
            matches!(err, ContractError::PipelineSpawn { .. }),
            "got: {err}"
        );
    }

    #[tokio::test]
    async fn test_env_and_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut command = sh("test \"$PREDICTOR_MODE\" = batch && touch ran.marker");
        command
            .env
            .insert("PREDICTOR_MODE".to_string(), "batch".to_string());
        command.working_dir = Some(dir.path().to_path_buf());

        let pipeline = CommandPipeline::new("env", command);
        pipeline.run().await.unwrap();
        assert!(dir.path().join("ran.marker").exists());
    }

    #[tokio::test]
    async fn test_large_output_does_not_block() {
        let pipeline = CommandPipeline::new(
            "chatty",
            sh("i=0; while [ $i -lt 5000 ]; do echo line-$i; echo err-$i >&2; i=$((i+1)); done"),
        )
        .with_output(OutputMode::Quiet);
        assert!(pipeline.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_non_utf8_output_keeps_draining() {
        // Output after the invalid line must still be read, or the child dies of SIGPIPE
        let pipeline = CommandPipeline::new(
            "binary",
            sh("printf 'ok\\n\\377\\376\\n'; printf '\\377\\n' >&2; sleep 0.2; \
                i=0; while [ $i -lt 20000 ]; do echo line-$i; i=$((i+1)); done; exit 0"),
        )
        .with_output(OutputMode::Quiet);
        pipeline.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_output_is_copied_verbatim() {
        let input: &[u8] = b"prediction: 42.0\n\xff\xfe\nlast line without newline";
        let mut console = Vec::new();

        forward_output("inference", Some(input), &mut console, Stream::Stdout).await;

        assert_eq!(console, input);
    }

    #[tokio::test]
    async fn test_missing_stream_writes_nothing() {
        let mut console = Vec::new();
        forward_output::<&[u8], _>("inference", None, &mut console, Stream::Stderr).await;
        assert!(console.is_empty());
    }
}
