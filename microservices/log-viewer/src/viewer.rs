//! The interactive loop
//!
//! Query failures are printed and the menu comes back; only terminal I/O
//! errors end the session early.

use logpipe_store::{LogQuery, LogReader};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::warn;

use crate::config::ViewerSettings;
use crate::format::{api_log_line, metric_line};
use crate::menu::{MenuChoice, MENU};

/// Most rows fetched per tail poll
const TAIL_BATCH: i64 = 100;

pub struct Viewer<'a, In, Out> {
    reader: &'a dyn LogReader,
    input: Lines<In>,
    output: Out,
    settings: ViewerSettings,
}

impl<'a, In, Out> Viewer<'a, In, Out>
where
    In: AsyncBufRead + Unpin,
    Out: AsyncWrite + Unpin,
{
    pub fn new(reader: &'a dyn LogReader, input: In, output: Out, settings: ViewerSettings) -> Self {
        Self {
            reader,
            input: input.lines(),
            output,
            settings,
        }
    }

    pub fn into_output(self) -> Out {
        self.output
    }

    /// Show the menu until the user exits or input ends
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            self.write(MENU).await?;
            let Some(line) = self.prompt("Select an option: ").await? else {
                break;
            };
            match MenuChoice::parse(&line) {
                Some(MenuChoice::Exit) => break,
                Some(choice) => self.dispatch(choice).await?,
                None => self.write_line("Invalid option, choose 1-8").await?,
            }
        }
        self.write_line("Goodbye").await
    }

    async fn dispatch(&mut self, choice: MenuChoice) -> io::Result<()> {
        let limit = self.settings.log_limit;
        let query = match choice {
            MenuChoice::RecentLogs => LogQuery::Recent { limit },
            MenuChoice::RecentMetrics => return self.show_metrics().await,
            MenuChoice::ByEndpoint => {
                let Some(endpoint) = self.prompt("Endpoint: ").await? else {
                    return Ok(());
                };
                LogQuery::ByEndpoint {
                    endpoint: endpoint.trim().to_string(),
                    limit,
                }
            }
            MenuChoice::ByStatus => {
                let Some(raw) = self.prompt("Status code: ").await? else {
                    return Ok(());
                };
                match raw.trim().parse::<i32>() {
                    Ok(status) => LogQuery::ByStatus { status, limit },
                    Err(_) => return self.write_line("Invalid status code").await,
                }
            }
            MenuChoice::SlowResponses => LogQuery::slow_responses(limit),
            MenuChoice::Errors => LogQuery::Errors { limit },
            MenuChoice::Tail => return self.tail().await,
            MenuChoice::Exit => return Ok(()),
        };
        self.show_logs(&query).await
    }

    async fn show_logs(&mut self, query: &LogQuery) -> io::Result<()> {
        match self.reader.api_logs(query).await {
            Ok(rows) if rows.is_empty() => self.write_line("No matching logs").await,
            Ok(rows) => {
                for row in &rows {
                    self.write_line(&api_log_line(row)).await?;
                }
                Ok(())
            }
            Err(e) => self.query_failed(&e).await,
        }
    }

    async fn show_metrics(&mut self) -> io::Result<()> {
        match self.reader.recent_metrics(self.settings.metrics_limit).await {
            Ok(rows) if rows.is_empty() => self.write_line("No metrics recorded").await,
            Ok(rows) => {
                for row in &rows {
                    self.write_line(&metric_line(row)).await?;
                }
                Ok(())
            }
            Err(e) => self.query_failed(&e).await,
        }
    }

    /// Print rows newer than the current maximum id, polling until the
    /// tail duration has elapsed
    async fn tail(&mut self) -> io::Result<()> {
        let mut last_id = match self.reader.max_api_log_id().await {
            Ok(id) => id,
            Err(e) => return self.query_failed(&e).await,
        };

        let interval = self.settings.tail_interval;
        let duration = self.settings.tail_duration;
        let polls = duration
            .as_millis()
            .checked_div(interval.as_millis())
            .unwrap_or(1)
            .max(1);

        self.write_line(&format!(
            "Tailing new logs for {}s (polling every {}s)...",
            duration.as_secs(),
            interval.as_secs()
        ))
        .await?;

        for _ in 0..polls {
            tokio::time::sleep(interval).await;

            let query = LogQuery::After {
                last_id,
                limit: TAIL_BATCH,
            };
            match self.reader.api_logs(&query).await {
                Ok(rows) => {
                    for row in &rows {
                        self.write_line(&api_log_line(row)).await?;
                        last_id = last_id.max(row.id);
                    }
                }
                Err(e) => self.query_failed(&e).await?,
            }
        }

        self.write_line("Tail finished").await
    }

    async fn query_failed(&mut self, error: &dyn std::fmt::Display) -> io::Result<()> {
        warn!(error = %error, "Query failed");
        self.write_line(&format!("Query failed: {}", error)).await
    }

    async fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        self.write(label).await?;
        self.input.next_line().await
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }

    async fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.write(text).await?;
        self.write("\n").await
    }
}
