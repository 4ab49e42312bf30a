//! The configuration page: a single string-built HTML form prefilled from
//! the persisted history, plus the list of generated artifacts.

use axum::{extract::State, response::Html};

use coverscan_core::html::escape;
use coverscan_model::ImageType;

use crate::artifacts;
use crate::history::StoredSettings;
use crate::state::AppState;

/// `GET /`.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let history = state.history.snapshot();
    let settings = history.last_used.clone().unwrap_or_default();
    let groups = artifacts::list(&state.config.output_dir);

    let mut page = String::with_capacity(16 * 1024);
    page.push_str(HEAD);
    page.push_str("<h1>Coverscan</h1>\n<p>Inventory the artwork of a media library and report what is missing or undersized.</p>\n");
    page.push_str(&form(&settings, &history.servers, &history.libraries));
    page.push_str(&generated_listing(&groups));
    page.push_str(SCRIPT);
    page.push_str("</body>\n</html>\n");
    Html(page)
}

fn form(
    settings: &StoredSettings,
    servers: &[String],
    libraries: &[String],
) -> String {
    let colors = settings.colors.clone().unwrap_or_default();
    let tracked_default_all = settings.images.is_empty();

    let mut out = String::new();
    out.push_str("<form id=\"run-form\">\n<fieldset><legend>Server</legend>\n");
    out.push_str(&format!(
        r#"<label>Server URL <input name="server" list="known-servers" value="{}" required></label>
<label>API key <input name="api_key" type="password" value="{}" required></label>
<label>Library <input name="library" list="known-libraries" required></label>
"#,
        escape(&settings.server),
        escape(&settings.api_key),
    ));
    out.push_str(&datalist("known-servers", servers));
    out.push_str(&datalist("known-libraries", libraries));
    out.push_str("</fieldset>\n");

    out.push_str("<fieldset><legend>Tracked image types</legend>\n");
    for image_type in ImageType::ALL {
        let checked = if tracked_default_all
            || settings.images.contains(&image_type)
        {
            " checked"
        } else {
            ""
        };
        out.push_str(&format!(
            "<label class=\"inline\"><input type=\"checkbox\" name=\"images\" value=\"{image_type}\"{checked}> {image_type}</label>\n",
        ));
    }
    out.push_str("</fieldset>\n");

    out.push_str(&format!(
        r#"<fieldset><legend>Minimum resolution</legend>
<label>Min width <input name="min_width" type="number" min="0" value="{}"></label>
<label>Min height <input name="min_height" type="number" min="0" value="{}"></label>
<p class="hint">Zero or empty disables that check.</p>
</fieldset>
"#,
        settings
            .thresholds
            .min_width
            .map(|w| w.to_string())
            .unwrap_or_default(),
        settings
            .thresholds
            .min_height
            .map(|h| h.to_string())
            .unwrap_or_default(),
    ));

    out.push_str(&format!(
        r#"<fieldset><legend>Report appearance</legend>
<label>Background <input name="background" type="color" value="{}"></label>
<label>Text <input name="text" type="color" value="{}"></label>
<label>Table background <input name="table_background" type="color" value="{}"></label>
<label class="inline"><input type="checkbox" name="embedded"{}> Embed images into the HTML</label>
</fieldset>
"#,
        escape(&colors.background),
        escape(&colors.text),
        escape(&colors.table_background),
        if settings.embedded { " checked" } else { "" },
    ));

    out.push_str("<fieldset><legend>Export file names</legend>\n");
    for image_type in ImageType::ALL {
        let value = settings
            .file_basenames
            .get(&image_type)
            .map(String::as_str)
            .unwrap_or_default();
        out.push_str(&format!(
            "<label>{image_type} <input name=\"basename_{image_type}\" value=\"{}\" placeholder=\"{}\"></label>\n",
            escape(value),
            image_type.default_export_basename(),
        ));
    }
    out.push_str("</fieldset>\n");

    out.push_str(
        r#"<div class="actions">
<button type="submit" data-kind="html">Generate HTML report</button>
<button type="submit" data-kind="zip">Create ZIP export</button>
</div>
<div id="status"></div>
</form>
"#,
    );
    out
}

fn datalist(id: &str, values: &[String]) -> String {
    let mut out = format!("<datalist id=\"{id}\">");
    for value in values {
        out.push_str(&format!("<option value=\"{}\">", escape(value)));
    }
    out.push_str("</datalist>\n");
    out
}

fn generated_listing(groups: &[artifacts::ArtifactGroup]) -> String {
    if groups.is_empty() {
        return String::new();
    }
    let mut out = String::from("<h2>Generated reports</h2>\n");
    for group in groups {
        out.push_str(&format!("<h3>{}</h3>\n<ul>\n", escape(&group.library)));
        for file in &group.files {
            let href = format!("/output/{}/{}", group.library, file);
            let download = format!("/download/{}/{}", group.library, file);
            out.push_str(&format!(
                r#"<li><a href="{href}" target="_blank">{name}</a> <a href="{download}">download</a> <button class="delete" data-href="{href}">delete</button></li>
"#,
                href = escape(&href),
                download = escape(&download),
                name = escape(file),
            ));
        }
        out.push_str("</ul>\n");
    }
    out
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Coverscan</title>
<style>
body { font-family: sans-serif; background: #111; color: #eee; max-width: 900px; margin: 0 auto; padding: 20px; }
fieldset { border: 1px solid #555; border-radius: 8px; margin-bottom: 16px; }
label { display: block; margin: 6px 0; }
label.inline { display: inline-block; margin-right: 14px; }
input { background: #222; color: #eee; border: 1px solid #555; border-radius: 4px; padding: 4px 6px; }
button { font-size: 15px; padding: 8px 14px; border-radius: 6px; cursor: pointer; }
.hint { font-size: 13px; opacity: 0.7; }
.actions { margin: 14px 0; display: flex; gap: 10px; }
#status { margin-top: 10px; min-height: 24px; }
#status.error { color: #f66; }
a { color: #9cf; }
ul { list-style: none; padding-left: 0; }
li { margin: 4px 0; }
</style>
</head>
<body>
"#;

const SCRIPT: &str = r#"<script>
const form = document.getElementById('run-form');
const status = document.getElementById('status');
let kind = 'html';

form.querySelectorAll('button[data-kind]').forEach(btn => {
  btn.addEventListener('click', () => { kind = btn.dataset.kind; });
});

form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const data = new FormData(form);
  const body = {
    server: data.get('server'),
    api_key: data.get('api_key'),
    library: data.get('library'),
    kind: kind,
    images: data.getAll('images'),
    embedded: data.get('embedded') !== null,
    naming: { file_basenames: {} }
  };
  const width = parseInt(data.get('min_width'), 10);
  if (!isNaN(width)) body.min_width = width;
  const height = parseInt(data.get('min_height'), 10);
  if (!isNaN(height)) body.min_height = height;
  body.colors = {
    background: data.get('background'),
    text: data.get('text'),
    table_background: data.get('table_background')
  };
  for (const [key, value] of data.entries()) {
    if (key.startsWith('basename_') && value.trim() !== '') {
      body.naming.file_basenames[key.slice('basename_'.length)] = value.trim();
    }
  }

  status.className = '';
  status.textContent = 'Starting run...';
  try {
    const resp = await fetch('/runs', {
      method: 'POST',
      headers: {'Content-Type': 'application/json'},
      body: JSON.stringify(body)
    });
    const payload = await resp.json();
    if (!resp.ok) throw new Error(payload.error ? payload.error.message : resp.statusText);
    poll(payload.run_id);
  } catch (err) {
    status.className = 'error';
    status.textContent = 'Failed to start run: ' + err.message;
  }
});

async function poll(runId) {
  status.textContent = 'Running...';
  const timer = setInterval(async () => {
    const resp = await fetch('/runs/' + runId);
    if (!resp.ok) { clearInterval(timer); status.className = 'error'; status.textContent = 'Run disappeared'; return; }
    const run = await resp.json();
    if (run.status === 'completed') {
      clearInterval(timer);
      let text = 'Done: ' + run.summary.complete + ' complete, '
        + run.summary.with_missing + ' missing artwork, '
        + run.summary.with_low_res + ' low-resolution.';
      if (run.diagnostics.length) {
        text += ' ' + run.diagnostics.length + ' image(s) could not be checked.';
      }
      status.innerHTML = text
        + ' <a href="/output/' + encodeURI(run.artifact) + '" target="_blank">View</a>'
        + ' <a href="/download/' + encodeURI(run.artifact) + '">Download</a>';
    } else if (run.status === 'failed') {
      clearInterval(timer);
      status.className = 'error';
      status.textContent = 'Run failed: ' + run.reason;
    }
  }, 1500);
}

document.querySelectorAll('button.delete').forEach(btn => {
  btn.addEventListener('click', async () => {
    await fetch(btn.dataset.href, { method: 'DELETE' });
    location.reload();
  });
});
</script>
"#;
