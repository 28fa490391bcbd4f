use axum::{
    extract::{Path, State},
    http::{HeaderMap, header},
    response::Html,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use log::{info, warn};

use crate::AppState;
use crate::config::AdminCredentials;
use crate::error::AppError;
use crate::models::VoteRecord;

// GET /admin/:secret
pub async fn admin_page(
    State(state): State<AppState>,
    Path(secret): Path<String>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let Some(admin) = state.admin.as_deref() else {
        warn!("Admin page requested but no admin credentials are configured");
        return Err(AppError::Forbidden);
    };
    authorize(admin, &secret, &headers)?;

    let records = state.store.all_records().await?;
    info!("Admin page served with {} vote(s)", records.len());

    Ok(Html(render_table(&records)))
}

/// Basic login first, then the path secret.
pub fn authorize(admin: &AdminCredentials, secret: &str, headers: &HeaderMap) -> Result<(), AppError> {
    match basic_credentials(headers) {
        Some((user, pass)) if user == admin.username && pass == admin.password => {}
        _ => {
            warn!("Admin login failed");
            return Err(AppError::Unauthorized);
        }
    }

    if secret != admin.secret_key {
        warn!("Admin page requested with a wrong key");
        return Err(AppError::Forbidden);
    }

    Ok(())
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn render_table(records: &[VoteRecord]) -> String {
    let mut rows = String::new();
    for record in records {
        let when = record
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        rows.push_str(&format!(
            "            <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&record.username),
            escape_html(&record.option),
            when
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Admin panel</title>
    <style>
        body {{ font-family: Arial; padding: 20px; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
        th {{ background-color: #f2f2f2; }}
    </style>
</head>
<body>
    <h1>Voters (total: {count})</h1>
    <table>
        <tr><th>User</th><th>Language</th><th>Date/time</th></tr>
{rows}    </table>
</body>
</html>
"#,
        count = records.len(),
        rows = rows
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
