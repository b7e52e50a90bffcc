//! HTML chrome for the public site and the admin area.
//!
//! Page bodies come from the renderer; this module only wraps them in the
//! document shell, navigation and the builder's client script.

use chrono::{DateTime, Datelike, Utc};
use marble_evaluator::{escape_html, Device};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Uk,
    En,
}

struct SiteCopy {
    code: &'static str,
    home: &'static str,
    about: &'static str,
    switch_label: &'static str,
    hero_title: &'static str,
    hero_subtitle: &'static str,
    hero_cta: &'static str,
    about_title: &'static str,
    about_body: &'static [&'static str],
}

const UK: SiteCopy = SiteCopy {
    code: "uk",
    home: "Головна",
    about: "Про нас",
    switch_label: "EN",
    hero_title: "Мармур, що переживе століття",
    hero_subtitle: "Видобуток, обробка та доставка натурального каменю.",
    hero_cta: "Зв'язатися з нами",
    about_title: "Про нас",
    about_body: &[
        "Ми працюємо з власним кар'єром і виготовляємо плити, сходи та підвіконня під замовлення.",
        "Кожен блок проходить ручний відбір, а готові вироби доставляємо по всій країні.",
    ],
};

const EN: SiteCopy = SiteCopy {
    code: "en",
    home: "Home",
    about: "About",
    switch_label: "UA",
    hero_title: "Marble that outlasts centuries",
    hero_subtitle: "Quarrying, finishing and delivering natural stone.",
    hero_cta: "Get in touch",
    about_title: "About us",
    about_body: &[
        "We run our own quarry and cut slabs, stairs and sills to order.",
        "Every block is picked by hand and finished pieces ship nationwide.",
    ],
};

impl Lang {
    fn copy(&self) -> &'static SiteCopy {
        match self {
            Lang::Uk => &UK,
            Lang::En => &EN,
        }
    }

    /// Route prefix: Ukrainian lives at the root
    pub fn prefix(&self) -> &'static str {
        match self {
            Lang::Uk => "",
            Lang::En => "/en",
        }
    }

    fn other(&self) -> Lang {
        match self {
            Lang::Uk => Lang::En,
            Lang::En => Lang::Uk,
        }
    }

    pub fn home_path(&self) -> String {
        match self {
            Lang::Uk => "/".to_string(),
            Lang::En => "/en".to_string(),
        }
    }

    pub fn about_path(&self) -> String {
        format!("{}/about", self.prefix())
    }
}

const SITE_CSS: &str = r#"
body{margin:0;font-family:system-ui,sans-serif;color:#1f2933;background:#fafaf9}
.site-header{display:flex;justify-content:space-between;align-items:center;padding:16px 32px;border-bottom:1px solid #e7e5e4}
.site-header nav a{margin-left:16px;color:inherit;text-decoration:none}
.site-footer{padding:24px 32px;color:#78716c;font-size:14px}
main{min-height:60vh}
.pb-hero{padding:96px 32px;text-align:center;background:#f5f5f4}
.pb-hero h1{font-size:48px;margin:0 0 16px}
.pb-button,.pb-hero a{display:inline-block;padding:12px 24px;background:#1c1917;color:#fff;border-radius:6px;text-decoration:none}
.pb-grid{display:grid;gap:24px}
.pb-section,.pb-container{padding:32px}
.pb-about{max-width:720px;margin:0 auto;padding:64px 32px}
.shadow-sm{box-shadow:0 1px 2px rgba(0,0,0,.05)}
.shadow-md{box-shadow:0 4px 6px rgba(0,0,0,.1)}
.shadow-lg{box-shadow:0 10px 15px rgba(0,0,0,.1)}
.shadow-xl{box-shadow:0 20px 25px rgba(0,0,0,.1)}
"#;

/// Public document shell with header, language switch and footer
pub fn public_page(lang: Lang, title: &str, body_html: &str) -> String {
    let copy = lang.copy();
    let other = lang.other();
    format!(
        r#"<!DOCTYPE html>
<html lang="{code}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
<header class="site-header">
<a class="brand" href="{home_path}">Marble</a>
<nav><a href="{home_path}">{home}</a><a href="{about_path}">{about}</a><a href="{switch_path}">{switch_label}</a></nav>
</header>
<main>
{body}
</main>
<footer class="site-footer">&copy; {year} Marble</footer>
</body>
</html>
"#,
        code = copy.code,
        title = escape_html(title),
        css = SITE_CSS,
        home_path = lang.home_path(),
        about_path = lang.about_path(),
        switch_path = other.home_path(),
        home = copy.home,
        about = copy.about,
        switch_label = copy.switch_label,
        body = body_html,
        year = Utc::now().year(),
    )
}

/// Hero shown on the home page while nothing has been published
pub fn static_hero(lang: Lang) -> String {
    let copy = lang.copy();
    format!(
        r#"<section class="pb-hero"><h1>{}</h1><p>{}</p><a href="{}">{}</a></section>"#,
        copy.hero_title,
        copy.hero_subtitle,
        lang.about_path(),
        copy.hero_cta
    )
}

pub fn about_page(lang: Lang) -> String {
    let copy = lang.copy();
    let paragraphs: String = copy
        .about_body
        .iter()
        .map(|p| format!("<p>{}</p>", p))
        .collect();
    let body = format!(
        r#"<article class="pb-about"><h1>{}</h1>{}</article>"#,
        copy.about_title, paragraphs
    );
    public_page(lang, copy.about_title, &body)
}

const ADMIN_CSS: &str = r#"
body{margin:0;font-family:system-ui,sans-serif;background:#f3f4f6;color:#111827}
.admin-bar{display:flex;justify-content:space-between;align-items:center;padding:12px 24px;background:#111827;color:#fff}
.admin-bar a,.admin-bar button{color:#fff;background:none;border:0;cursor:pointer;margin-left:12px;text-decoration:none;font:inherit}
.admin-main{padding:24px}
.login{max-width:360px;margin:96px auto;background:#fff;padding:32px;border-radius:8px}
.login label{display:block;margin-top:12px}
.login input{width:100%;padding:8px;box-sizing:border-box}
.login .error{color:#b91c1c;background:#fef2f2;padding:8px;border-radius:4px}
.stats{display:flex;gap:16px}
.stat{background:#fff;padding:16px 24px;border-radius:8px;min-width:160px}
.stat strong{display:block;font-size:28px}
.pb-shell{display:grid;grid-template-columns:220px 1fr 320px;gap:16px;height:calc(100vh - 110px)}
.pb-palette,.pb-inspector{background:#fff;border-radius:8px;padding:12px;overflow:auto}
.pb-widget{padding:8px;margin:4px 0;border:1px solid #d1d5db;border-radius:4px;cursor:grab;user-select:none}
.pb-stage{overflow:auto;background:#e5e7eb;padding:16px}
.pb-canvas{margin:0 auto;background:#fff;min-height:400px}
.pb-element{position:relative;outline:1px dashed transparent}
.pb-element:hover{outline-color:#93c5fd}
.pb-element.is-selected{outline:2px solid #2563eb}
.pb-column{min-height:64px;border:1px dashed #d1d5db}
.pb-column-label,.pb-badge{font-size:11px;color:#6b7280}
.pb-empty{padding:64px;text-align:center;color:#6b7280}
.pb-toolbar{display:flex;gap:8px;margin-bottom:12px}
.pb-toolbar .active{font-weight:bold}
.pb-proxy{position:fixed;pointer-events:none;padding:6px 10px;background:#2563eb;color:#fff;border-radius:4px;opacity:.85;z-index:10}
.pb-field{margin-bottom:12px}.pb-field label{display:block;font-size:12px;color:#6b7280}
.pb-field input,.pb-field textarea,.pb-field select{width:100%;box-sizing:border-box}
"#;

fn admin_page(title: &str, email: Option<&str>, body_html: &str) -> String {
    let bar = match email {
        Some(email) => format!(
            r#"<div class="admin-bar"><span>Marble Admin</span><span>{}<a href="/admin-portal">Dashboard</a><a href="/admin-portal/page-builder">Page Builder</a><form method="post" action="/admin-logout" style="display:inline"><button type="submit">Sign out</button></form></span></div>"#,
            escape_html(email)
        ),
        None => String::new(),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
{bar}
{body}
</body>
</html>
"#,
        title = escape_html(title),
        css = ADMIN_CSS,
        bar = bar,
        body = body_html,
    )
}

/// Sign-in form; an auth failure is shown inline above the fields
pub fn login_page(error: Option<&str>, email: &str) -> String {
    let error = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<form class="login" method="post" action="/admin-login">
<h1>Admin Login</h1>
{error}
<label>Email<input type="email" name="email" value="{email}" required></label>
<label>Password<input type="password" name="password" required></label>
<p><button type="submit">Sign in</button></p>
</form>"#,
        error = error,
        email = escape_html(email),
    );
    admin_page("Admin Login", None, &body)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub email: String,
    /// None when the document store could not be listed
    pub page_count: Option<usize>,
    pub slug: String,
    pub element_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn dashboard_page(stats: &DashboardStats) -> String {
    let pages = stats
        .page_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "?".to_string());
    let updated = stats
        .updated_at
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "never".to_string());
    let body = format!(
        r#"<div class="admin-main">
<h1>Dashboard</h1>
<div class="stats">
<div class="stat"><strong>{pages}</strong>Stored pages</div>
<div class="stat"><strong>{elements}</strong>Elements on "{slug}"</div>
<div class="stat"><strong>{updated}</strong>Last update</div>
</div>
<p><a href="/admin-portal/page-builder">Open the page builder</a></p>
</div>"#,
        pages = pages,
        elements = stats.element_count,
        slug = escape_html(&stats.slug),
        updated = updated,
    );
    admin_page("Dashboard", Some(&stats.email), &body)
}

const BUILDER_JS: &str = r#"
(function(){
const api = p => '/admin-portal/page-builder/api/' + p;
const post = (p, body) => fetch(api(p), {method:'POST', headers:{'Content-Type':'application/json'}, body: JSON.stringify(body || {})});
const canvasHost = document.getElementById('pb-canvas-host');
const inspectorHost = document.getElementById('pb-inspector-host');
let proxy = null;

async function refreshCanvas(){ canvasHost.innerHTML = await (await fetch(api('canvas'))).text(); }
async function refreshInspector(){ inspectorHost.innerHTML = await (await fetch(api('inspector'))).text(); }
async function refresh(){ await Promise.all([refreshCanvas(), refreshInspector()]); }
async function check(res){ if(!res.ok){ const body = await res.json().catch(() => ({})); alert(body.error || res.statusText); } return res; }

document.addEventListener('mousedown', e => {
  const widget = e.target.closest('[data-widget]');
  if(!widget) return;
  e.preventDefault();
  post('drag/start', {source:{kind:'widget', id: widget.dataset.widget}, x:e.clientX, y:e.clientY});
  proxy = document.createElement('div');
  proxy.className = 'pb-proxy'; proxy.textContent = widget.textContent; proxy.hidden = true;
  document.body.appendChild(proxy);
});
document.addEventListener('mousemove', e => {
  if(!proxy) return;
  post('drag/move', {x:e.clientX, y:e.clientY}).then(r => r.json()).then(s => { proxy.hidden = !s.dragging; });
  proxy.style.left = (e.clientX + 8) + 'px'; proxy.style.top = (e.clientY + 8) + 'px';
});
document.addEventListener('mouseup', async e => {
  if(!proxy) return;
  proxy.remove(); proxy = null;
  const zone = e.target.closest('[data-drop-target]');
  let target = {kind:'outside'};
  if(zone && zone.dataset.dropTarget === 'column') target = {kind:'column', sectionId: zone.dataset.sectionId, columnIndex: Number(zone.dataset.column)};
  else if(zone) target = {kind:'canvas'};
  await check(await post('drag/end', {target}));
  await refresh();
});

canvasHost.addEventListener('click', async e => {
  const el = e.target.closest('[data-select]');
  if(el){ e.stopPropagation(); await post('select', {id: el.dataset.elementId}); }
  else if(e.target.closest('[data-deselect]')){ await post('select', {id: null}); }
  await refresh();
});

inspectorHost.addEventListener('input', e => {
  const f = e.target;
  if(!f.dataset.field) return;
  post('update', {group: f.dataset.group, field: f.dataset.field, value: f.value}).then(check).then(refreshCanvas);
});
inspectorHost.addEventListener('change', async e => {
  const f = e.target;
  if(f.type !== 'file' || !f.files.length) return;
  const file = f.files[0];
  const q = new URLSearchParams({field: f.dataset.uploadField, group: 'content', fileName: file.name});
  await check(await fetch(api('upload?' + q), {method:'POST', headers:{'Content-Type': file.type || 'application/octet-stream'}, body: file}));
});
inspectorHost.addEventListener('click', async e => {
  const tab = e.target.closest('[data-tab]');
  if(tab){ await post('tab', {tab: tab.dataset.tab}); await refreshInspector(); return; }
  if(e.target.closest('[data-action="delete"]')){ await check(await post('delete', {})); await refresh(); }
});

document.querySelectorAll('[data-device-option]').forEach(b => b.addEventListener('click', async () => {
  await post('device', {device: b.dataset.deviceOption});
  document.querySelectorAll('[data-device-option]').forEach(o => o.classList.toggle('active', o === b));
  await refreshCanvas();
}));
document.querySelectorAll('[data-save]').forEach(b => b.addEventListener('click', async () => {
  const res = await check(await post(b.dataset.save, {}));
  if(res.ok) b.textContent = b.dataset.label + ' ✓';
}));

const feed = new EventSource(api('events'));
feed.onmessage = e => {
  const ev = JSON.parse(e.data);
  if(ev.type === 'alert') alert(ev.message);
  else if(ev.type === 'uploaded') refresh();
  else if(ev.type === 'change' && ev.change.kind !== 'updated') refresh();
};
})();
"#;

/// Three-pane builder: palette, canvas stage, inspector
pub fn builder_page(
    email: &str,
    device: Device,
    palette_html: &str,
    canvas_html: &str,
    inspector_html: &str,
) -> String {
    let devices: String = [Device::Desktop, Device::Tablet, Device::Mobile]
        .iter()
        .map(|d| {
            let active = if *d == device { r#" class="active""# } else { "" };
            format!(
                r#"<button type="button" data-device-option="{name}"{active}>{name}</button>"#,
                name = d.as_str(),
                active = active
            )
        })
        .collect();
    let body = format!(
        r#"<div class="admin-main">
<div class="pb-toolbar">{devices}<span style="flex:1"></span><button type="button" data-save="save" data-label="Save Draft">Save Draft</button><button type="button" data-save="publish" data-label="Publish">Publish</button></div>
<div class="pb-shell">
{palette}
<div class="pb-stage" id="pb-canvas-host">{canvas}</div>
<div id="pb-inspector-host">{inspector}</div>
</div>
</div>
<script>{script}</script>"#,
        devices = devices,
        palette = palette_html,
        canvas = canvas_html,
        inspector = inspector_html,
        script = BUILDER_JS,
    );
    admin_page("Page Builder", Some(email), &body)
}
