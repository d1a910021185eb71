use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::config::AudioConfig;
use crate::foundation::error::{ReelError, ReelResult};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// `yt-dlp` invocation settings shared by search and download.
#[derive(Clone, Debug)]
pub struct YtDlp {
    program: PathBuf,
    cookies_file: Option<PathBuf>,
    cookies_from_browser: Option<String>,
    user_agent: String,
    limit_rate: Option<String>,
}

impl YtDlp {
    pub fn from_config(cfg: &AudioConfig) -> Self {
        Self {
            program: cfg.ytdlp_path.clone(),
            cookies_file: cfg.cookies_file.clone(),
            cookies_from_browser: cfg.cookies_from_browser.clone(),
            user_agent: cfg.user_agent.clone(),
            limit_rate: cfg.limit_rate.clone(),
        }
    }

    /// Browser cookies win over a cookie file; a missing file is ignored.
    pub fn cookie_args(&self) -> Vec<String> {
        if let Some(browser) = self.cookies_from_browser.as_deref().filter(|b| !b.is_empty()) {
            return vec!["--cookies-from-browser".to_owned(), browser.to_owned()];
        }
        match &self.cookies_file {
            Some(path) if path.is_file() => {
                vec!["--cookies".to_owned(), path.display().to_string()]
            }
            Some(path) => {
                tracing::warn!(path = %path.display(), "cookie file not found, continuing without cookies");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Browser-like headers, rate limit and cookies.
    pub fn common_args(&self) -> Vec<String> {
        let mut args = vec![
            "--user-agent".to_owned(),
            self.user_agent.clone(),
            "--add-header".to_owned(),
            "Accept-Language:fr-FR,fr;q=0.9,en;q=0.8".to_owned(),
            "--add-header".to_owned(),
            "Accept:text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_owned(),
        ];
        if let Some(rate) = &self.limit_rate {
            args.push("--limit-rate".to_owned());
            args.push(rate.clone());
        }
        args.extend(self.cookie_args());
        args
    }

    pub async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Video id of the first `ytsearch1:` hit for `query`.
    pub async fn search_id(&self, query: &str) -> ReelResult<Option<String>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--get-id", "--default-search", "ytsearch1:"])
            .args(self.common_args())
            .arg(query);
        let out = run(cmd, SEARCH_TIMEOUT).await?;
        if !out.status.success() {
            return Err(ReelError::adapter(
                "yt-dlp",
                format!(
                    "search exited with {}: {}",
                    out.status,
                    String::from_utf8_lossy(&out.stderr).trim()
                ),
            ));
        }
        let stdout = String::from_utf8_lossy(&out.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_owned))
    }

    /// Extract the best audio of `url` as m4a into `out`.
    #[tracing::instrument(skip(self), fields(out = %out.display()))]
    pub async fn download_audio(&self, url: &str, out: &Path) -> ReelResult<()> {
        if out.exists() {
            tokio::fs::remove_file(out)
                .await
                .map_err(|e| ReelError::adapter("yt-dlp", format!("remove stale audio: {e}")))?;
        }
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "--extract-audio",
            "--audio-format",
            "m4a",
            "--audio-quality",
            "0",
            "--no-playlist",
            "--ignore-errors",
            "--output",
        ])
        .arg(out)
        .args(self.common_args())
        .arg(url);

        let result = run(cmd, DOWNLOAD_TIMEOUT).await?;
        if !result.status.success() || !out.is_file() {
            return Err(ReelError::adapter(
                "yt-dlp",
                format!(
                    "download exited with {}: {}",
                    result.status,
                    String::from_utf8_lossy(&result.stderr).trim()
                ),
            ));
        }
        Ok(())
    }
}

async fn run(mut cmd: Command, limit: Duration) -> ReelResult<std::process::Output> {
    cmd.stdin(Stdio::null()).kill_on_drop(true);
    match tokio::time::timeout(limit, cmd.output()).await {
        Ok(Ok(out)) => Ok(out),
        Ok(Err(e)) => Err(ReelError::adapter(
            "yt-dlp",
            format!("failed to run yt-dlp (is it installed?): {e}"),
        )),
        Err(_) => Err(ReelError::adapter(
            "yt-dlp",
            format!("timed out after {}s", limit.as_secs()),
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/acquire/ytdlp.rs"]
mod tests;
