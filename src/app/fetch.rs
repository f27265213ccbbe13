use crate::args::{PostArgs, UrlArgs};
use crate::error::AppResult;
use crate::http::{FetchClient, FetchedResponse, parse_target_url, validate_json_body};

use super::AppContext;
use super::format::Palette;

pub(crate) async fn run_get(args: &UrlArgs, ctx: &AppContext) -> AppResult<()> {
    let url = parse_target_url(&args.url)?;
    let client = FetchClient::new(&ctx.timer)?;
    let response = client.get(&url).await?;
    print!("{}", render_with_body(&response, ctx.palette));
    Ok(())
}

pub(crate) async fn run_post(args: &PostArgs, ctx: &AppContext) -> AppResult<()> {
    validate_json_body(&args.data)?;
    let url = parse_target_url(&args.url)?;
    let client = FetchClient::new(&ctx.timer)?;
    let response = client.post_json(&url, &args.data).await?;
    print!("{}", render_with_body(&response, ctx.palette));
    Ok(())
}

pub(crate) async fn run_head(args: &UrlArgs, ctx: &AppContext) -> AppResult<()> {
    let url = parse_target_url(&args.url)?;
    let client = FetchClient::new(&ctx.timer)?;
    let response = client.head(&url).await?;
    print!("{}", render_headers(&response, ctx.palette));
    Ok(())
}

fn status_line(response: &FetchedResponse, palette: Palette) -> String {
    let reason = response.status.canonical_reason().unwrap_or_default();
    format!("{} {}\n", palette.status(response.status), reason)
}

pub(super) fn render_with_body(response: &FetchedResponse, palette: Palette) -> String {
    let mut out = status_line(response, palette);
    for line in response.body.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub(super) fn render_headers(response: &FetchedResponse, palette: Palette) -> String {
    let mut out = status_line(response, palette);
    for (name, value) in &response.headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        out.push('\'');
        out.push_str(name.as_str());
        out.push_str("': ");
        out.push_str(&value);
        out.push('\n');
    }
    out
}
