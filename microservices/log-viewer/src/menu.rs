//! Menu choices

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    RecentLogs,
    RecentMetrics,
    ByEndpoint,
    ByStatus,
    SlowResponses,
    Errors,
    Tail,
    Exit,
}

pub const MENU: &str = "\
==== Log Viewer ====
1. Recent API logs
2. Recent system metrics
3. Filter logs by endpoint
4. Filter logs by status code
5. Slow responses (>200ms)
6. Errors
7. Tail new logs
8. Exit
";

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::RecentLogs),
            "2" => Some(Self::RecentMetrics),
            "3" => Some(Self::ByEndpoint),
            "4" => Some(Self::ByStatus),
            "5" => Some(Self::SlowResponses),
            "6" => Some(Self::Errors),
            "7" => Some(Self::Tail),
            "8" => Some(Self::Exit),
            _ => None,
        }
    }
}
