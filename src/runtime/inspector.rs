//! Inspector client for a running instance.

use reqwest::Response;
use serde_json::Value;

use crate::lifecycle::{InspectRequest, Inspector};

/// Queries `http://host:port/` and prints the result to stdout.
#[derive(Debug, Clone, Default)]
pub struct HttpInspector {
    client: reqwest::Client,
}

impl HttpInspector {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Inspector endpoint for a request.
pub fn inspector_url(request: &InspectRequest) -> String {
    if request.host.contains(':') && !request.host.starts_with('[') {
        format!("http://[{}]:{}/", request.host, request.port)
    } else {
        format!("http://{}:{}/", request.host, request.port)
    }
}

impl Inspector for HttpInspector {
    fn inspect(&self, request: &InspectRequest) {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                eprintln!("Error: could not start inspector client: {}", e);
                return;
            }
        };

        let url = inspector_url(request);
        if let Err(e) = runtime.block_on(query(&self.client, &url, request.raw)) {
            eprintln!("Error: could not reach inspector at {}: {}", url, e);
        }
    }
}

async fn query(
    client: &reqwest::Client,
    url: &str,
    raw: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let res = client.get(url).send().await?;
    print_response(res, raw).await
}

async fn print_response(res: Response, raw: bool) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Inspector returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let text = res.text().await?;
    if raw {
        println!("{}", text);
        return Ok(());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
