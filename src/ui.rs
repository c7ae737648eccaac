use crate::models::{AggregateStats, CHALLENGE_DAYS, ScoreRecord, Session, ViewMode};
use crate::stats::progress_percent;
use crate::store::{Dashboard, EntryForm};
use crate::validate::{MAX_SECTION_SCORE, MAX_WRITING_BAND};

pub fn render_index(dashboard: &Dashboard) -> String {
    let body = match &dashboard.session {
        None => render_login(dashboard.error.as_deref()),
        Some(session) => render_dashboard(session, dashboard),
    };
    INDEX_HTML.replace("{{BODY}}", &body)
}

fn render_login(error: Option<&str>) -> String {
    LOGIN_HTML.replace("{{ERROR}}", &error_banner(error))
}

fn render_dashboard(session: &Session, dashboard: &Dashboard) -> String {
    let name = escape(&session.identity.name);
    let friend = escape(&session.friend_name);
    let days = dashboard.my_scores.len();
    let progress = progress_percent(days);

    let mut html = String::new();
    html.push_str(&format!(
        r#"<section class="card header">
      <div class="header-row">
        <div>
          <h1>IELTS Challenge</h1>
          <h2>{name}</h2>
          <p class="subtitle">Day {days}/{CHALLENGE_DAYS}</p>
        </div>
        <form method="post" action="/logout"><button class="btn-logout" type="submit">Logout</button></form>
      </div>
      <div class="progress"><div class="progress-fill" style="width: {progress}%"></div></div>
      <p class="hint right">{progress}% Complete</p>
    </section>
"#
    ));

    html.push_str(r#"    <nav class="card tabs">"#);
    for (mode, label) in [
        (ViewMode::Own, format!("{name}'s Stats")),
        (ViewMode::Friend, format!("{friend}'s Stats")),
        (ViewMode::Compare, "Compare".to_string()),
    ] {
        let active = if dashboard.view == mode { " active" } else { "" };
        html.push_str(&format!(
            r#"<form method="post" action="/view/{}"><button class="tab{active}" type="submit">{label}</button></form>"#,
            mode.as_str()
        ));
    }
    html.push_str("</nav>\n");

    match dashboard.view {
        ViewMode::Compare => html.push_str(&render_compare(&name, &friend, dashboard)),
        ViewMode::Own => html.push_str(&render_stat_cards(&dashboard.my_stats)),
        ViewMode::Friend => html.push_str(&render_stat_cards(&dashboard.friend_stats)),
    }

    if dashboard.can_add() && dashboard.form.is_none() {
        html.push_str(
            r#"    <form method="post" action="/scores/new"><button class="btn-add" type="submit">+ Add Today's Score</button></form>
"#,
        );
    }

    if let Some(form) = &dashboard.form {
        html.push_str(&render_entry_form(form, days, dashboard.saving, dashboard.error.as_deref()));
    }

    match dashboard.view {
        ViewMode::Own => html.push_str(&render_history(
            "Your Journey",
            "No scores yet. Start your journey today!",
            &dashboard.my_scores,
            true,
        )),
        ViewMode::Friend => html.push_str(&render_history(
            "Friend's Journey",
            "Waiting for scores...",
            &dashboard.friend_scores,
            false,
        )),
        ViewMode::Compare => {}
    }

    html
}

fn render_stat_cards(stats: &AggregateStats) -> String {
    format!(
        r#"    <section class="panel">
      <div class="stat"><span class="label">Listening</span><span class="value">{:.1}</span><span class="hint">/ {MAX_SECTION_SCORE}</span></div>
      <div class="stat"><span class="label">Reading</span><span class="value">{:.1}</span><span class="hint">/ {MAX_SECTION_SCORE}</span></div>
      <div class="stat"><span class="label">Writing</span><span class="value">{:.1}</span><span class="hint">/ {MAX_WRITING_BAND}</span></div>
      <div class="stat"><span class="label">Days logged</span><span class="value">{}</span><span class="hint">of {CHALLENGE_DAYS}</span></div>
    </section>
"#,
        stats.avg_listening, stats.avg_reading, stats.avg_writing, stats.total
    )
}

fn render_compare(name: &str, friend: &str, dashboard: &Dashboard) -> String {
    let mine = &dashboard.my_stats;
    let theirs = &dashboard.friend_stats;
    let max_section = f64::from(MAX_SECTION_SCORE);

    let mut html = String::from("    <section class=\"card compare\">\n");
    for (label, own, other, max) in [
        ("Listening", mine.avg_listening, theirs.avg_listening, max_section),
        ("Reading", mine.avg_reading, theirs.avg_reading, max_section),
        ("Writing", mine.avg_writing, theirs.avg_writing, MAX_WRITING_BAND),
    ] {
        html.push_str(&format!(
            r#"      <div class="compare-row">
        <h3>{label}</h3>
        <div class="bar-line"><span class="who">{name}</span><div class="bar"><div class="bar-fill mine" style="width: {:.1}%"></div></div><span class="score">{own:.1}</span></div>
        <div class="bar-line"><span class="who">{friend}</span><div class="bar"><div class="bar-fill theirs" style="width: {:.1}%"></div></div><span class="score">{other:.1}</span></div>
      </div>
"#,
            bar_width(own, max),
            bar_width(other, max),
        ));
    }
    html.push_str(&format!(
        r#"      <div class="compare-row days">
        <h3>Days Logged</h3>
        <p><span class="who">{name}</span> {} &middot; <span class="who">{friend}</span> {}</p>
      </div>
    </section>
"#,
        mine.total, theirs.total
    ));
    html
}

fn render_entry_form(form: &EntryForm, days: usize, saving: bool, error: Option<&str>) -> String {
    let (title, submit) = match form.editing {
        Some(_) => ("Edit Score".to_string(), "Update Score"),
        None => (format!("Day {}", days + 1), "Save Score"),
    };
    let disabled = if saving { " disabled" } else { "" };
    format!(
        r#"    <section class="card entry">
      <h2>{title}</h2>
      {error}
      <form method="post" action="/scores">
        <label>Listening (0-40)<input name="listening" type="number" min="0" max="40" placeholder="28" value="{listening}" /></label>
        <label>Reading (0-40)<input name="reading" type="number" min="0" max="40" placeholder="32" value="{reading}" /></label>
        <label>Writing (0-9) - Optional<input name="writing" type="number" min="0" max="9" step="0.5" placeholder="7.5" value="{writing}" /></label>
        <div class="actions">
          <button class="btn-cancel" type="submit" formaction="/scores/cancel" formnovalidate>Cancel</button>
          <button class="btn-save" type="submit"{disabled}>{submit}</button>
        </div>
      </form>
    </section>
"#,
        error = error_banner(error),
        listening = escape(&form.draft.listening),
        reading = escape(&form.draft.reading),
        writing = escape(&form.draft.writing),
    )
}

fn render_history(title: &str, empty: &str, records: &[ScoreRecord], editable: bool) -> String {
    let mut html = format!("    <section class=\"card history\">\n      <h2>{title}</h2>\n");
    if records.is_empty() {
        html.push_str(&format!("      <p class=\"hint\">{empty}</p>\n"));
    }
    for record in records {
        let writing = if record.writing > 0.0 {
            format!("{}/9", record.writing)
        } else {
            "-".to_string()
        };
        let edit = if editable {
            format!(
                r#"<form method="post" action="/scores/{}/edit"><button class="btn-edit" type="submit">Edit</button></form>"#,
                escape(&record.id)
            )
        } else {
            String::new()
        };
        html.push_str(&format!(
            r#"      <article class="entry-row">
        <div class="entry-head"><strong>Day {}</strong><span class="hint">{}</span>{edit}</div>
        <div class="entry-scores"><span>Listening <b>{}/40</b></span><span>Reading <b>{}/40</b></span><span>Writing <b>{writing}</b></span></div>
      </article>
"#,
            record.day,
            record.created_at.format("%b %-d, %Y"),
            record.listening,
            record.reading,
        ));
    }
    html.push_str("    </section>\n");
    html
}

fn error_banner(error: Option<&str>) -> String {
    match error {
        Some(message) => format!(r#"<div class="error" role="alert">{}</div>"#, escape(message)),
        None => String::new(),
    }
}

fn bar_width(value: f64, max: f64) -> f64 {
    (value / max * 100.0).clamp(0.0, 100.0)
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const LOGIN_HTML: &str = r#"    <section class="card login">
      <header>
        <h1>IELTS Tracker</h1>
        <p class="subtitle">30-Day Challenge</p>
      </header>
      {{ERROR}}
      <form method="post" action="/login">
        <label>Name<input name="username" type="text" placeholder="your name" autocomplete="username" /></label>
        <button class="btn-save" type="submit">Login</button>
      </form>
    </section>
"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>IELTS Tracker</title>
  <style>
    :root {
      --grad: linear-gradient(135deg, #6366f1, #a855f7 55%, #ec4899);
      --ink: #1f2937;
      --muted: #6b7280;
      --accent: #6366f1;
      --accent-2: #a855f7;
      --danger: #ef4444;
      --card: #ffffff;
      --shadow: 0 20px 50px rgba(31, 41, 55, 0.22);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--grad);
      color: var(--ink);
      font-family: system-ui, "Segoe UI", sans-serif;
      padding: 16px 16px 80px;
    }

    main {
      width: min(680px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    .card {
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 22px;
    }

    .login {
      margin-top: 12vh;
      display: grid;
      gap: 20px;
      text-align: center;
    }

    h1 {
      margin: 0;
      font-size: 1.6rem;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.2rem;
    }

    .subtitle,
    .hint {
      margin: 0;
      color: var(--muted);
      font-size: 0.9rem;
    }

    .right {
      text-align: right;
    }

    .header-row {
      display: flex;
      justify-content: space-between;
      align-items: flex-start;
      margin-bottom: 14px;
    }

    .progress,
    .bar {
      width: 100%;
      height: 12px;
      border-radius: 999px;
      background: #e5e7eb;
      overflow: hidden;
    }

    .progress-fill,
    .bar-fill {
      height: 100%;
      border-radius: 999px;
      background: linear-gradient(90deg, #4ade80, #3b82f6);
      transition: width 400ms ease;
    }

    .bar-fill.mine {
      background: linear-gradient(90deg, var(--accent), var(--accent-2));
    }

    .bar-fill.theirs {
      background: linear-gradient(90deg, #f472b6, #fb7185);
    }

    .tabs {
      display: flex;
      gap: 8px;
      padding: 8px;
    }

    .tabs form {
      flex: 1;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 14px;
      padding: 12px 16px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      width: 100%;
    }

    button:disabled {
      opacity: 0.5;
      cursor: wait;
    }

    .tab {
      background: transparent;
      color: var(--muted);
    }

    .tab.active,
    .btn-save,
    .btn-add {
      background: linear-gradient(90deg, var(--accent), var(--accent-2));
      color: white;
    }

    .btn-add {
      padding: 16px;
      box-shadow: var(--shadow);
    }

    .btn-logout {
      background: var(--danger);
      color: white;
      width: auto;
    }

    .btn-cancel {
      background: #e5e7eb;
      color: var(--ink);
    }

    .btn-edit {
      background: #eef2ff;
      color: var(--accent);
      width: auto;
      padding: 6px 12px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 14px;
    }

    .stat {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 16px;
      display: grid;
      gap: 4px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.8rem;
      font-weight: 700;
      color: var(--accent);
    }

    .compare {
      display: grid;
      gap: 18px;
    }

    .compare h3 {
      margin: 0 0 8px;
      font-size: 1rem;
    }

    .bar-line {
      display: grid;
      grid-template-columns: 80px 1fr 48px;
      align-items: center;
      gap: 10px;
      margin-bottom: 6px;
    }

    .who {
      font-weight: 600;
      font-size: 0.85rem;
    }

    .score {
      text-align: right;
      font-weight: 600;
    }

    form label {
      display: grid;
      gap: 6px;
      font-weight: 600;
      font-size: 0.9rem;
      margin-bottom: 14px;
      text-align: left;
    }

    input {
      padding: 12px 14px;
      border-radius: 12px;
      border: 2px solid #e5e7eb;
      font-size: 1rem;
    }

    input:focus {
      outline: none;
      border-color: var(--accent);
    }

    .actions {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 12px;
    }

    .error {
      background: #fef2f2;
      border-left: 4px solid var(--danger);
      color: #b91c1c;
      padding: 12px 14px;
      border-radius: 8px;
      margin-bottom: 14px;
      font-size: 0.9rem;
    }

    .entry-row {
      border: 1px solid #f3f4f6;
      border-radius: 16px;
      padding: 14px;
      margin-top: 10px;
    }

    .entry-head {
      display: flex;
      gap: 10px;
      align-items: center;
      justify-content: space-between;
      margin-bottom: 8px;
    }

    .entry-scores {
      display: flex;
      gap: 16px;
      flex-wrap: wrap;
      font-size: 0.9rem;
      color: var(--muted);
    }

    .entry-scores b {
      color: var(--ink);
    }

    @media (max-width: 520px) {
      .tabs {
        flex-direction: column;
      }
      .bar-line {
        grid-template-columns: 64px 1fr 40px;
      }
    }
  </style>
</head>
<body>
  <main>
{{BODY}}
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;
    use crate::store::{Event, reduce};
    use chrono::{TimeZone, Utc};

    fn signed_in(records: Vec<ScoreRecord>) -> Dashboard {
        let session = Session {
            identity: Identity {
                id: "me".to_string(),
                name: "Kumush".to_string(),
                email: "k@x.io".to_string(),
            },
            friend_name: "Ezoza".to_string(),
        };
        let state = reduce(Dashboard::default(), Event::LoggedIn(session));
        let state = reduce(state, Event::FetchIssued);
        let generation = state.fetch_generation;
        reduce(state, Event::ScoresLoaded { generation, records })
    }

    fn record(id: &str, owner: &str, writing: f64) -> ScoreRecord {
        ScoreRecord {
            id: id.to_string(),
            owner_id: owner.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            listening: 28,
            reading: 32,
            writing,
            day: 1,
        }
    }

    #[test]
    fn login_page_escapes_error() {
        let state = reduce(Dashboard::default(), Event::LoginFailed("<bad>".to_string()));
        let html = render_index(&state);
        assert!(html.contains(r#"action="/login""#));
        assert!(html.contains("&lt;bad&gt;"));
        assert!(!html.contains("<bad>"));
    }

    #[test]
    fn own_view_offers_add_and_edit() {
        let html = render_index(&signed_in(vec![record("r1", "me", 6.5)]));
        assert!(html.contains("Day 1/30"));
        assert!(html.contains("Kumush's Stats"));
        assert!(html.contains("Ezoza's Stats"));
        assert!(html.contains("+ Add Today's Score"));
        assert!(html.contains(r#"action="/scores/r1/edit""#));
        assert!(html.contains("6.5/9"));
        assert!(html.contains("Mar 1, 2026"));
    }

    #[test]
    fn friend_view_is_read_only() {
        let state = signed_in(vec![record("r1", "them", 0.0)]);
        let state = reduce(state, Event::ViewSwitched(ViewMode::Friend));
        let html = render_index(&state);
        assert!(html.contains("Friend's Journey"));
        assert!(!html.contains("+ Add Today's Score"));
        assert!(!html.contains("/edit"));
        assert!(html.contains("Writing <b>-</b>"));
    }

    #[test]
    fn compare_view_scales_bars() {
        let state = signed_in(vec![record("r1", "me", 4.5)]);
        let state = reduce(state, Event::ViewSwitched(ViewMode::Compare));
        let html = render_index(&state);
        assert!(html.contains("Days Logged"));
        // 28 / 40 and 4.5 / 9
        assert!(html.contains("width: 70.0%"));
        assert!(html.contains("width: 50.0%"));
        assert!(!html.contains("Your Journey"));
    }

    #[test]
    fn open_form_shows_draft_and_error() {
        let state = reduce(signed_in(vec![]), Event::AddOpened);
        let state = reduce(
            state,
            Event::SubmitStarted(crate::models::ScoreDraft {
                listening: "41".to_string(),
                reading: "20".to_string(),
                writing: String::new(),
            }),
        );
        let state = reduce(state, Event::SubmitRejected("out of range".to_string()));
        let html = render_index(&state);
        assert!(html.contains("Day 1"));
        assert!(html.contains(r#"value="41""#));
        assert!(html.contains("out of range"));
        assert!(html.contains("Save Score"));
        assert!(!html.contains(" disabled>"));
    }

    #[test]
    fn empty_histories_have_their_own_wording() {
        let state = signed_in(vec![]);
        let html = render_index(&state);
        assert!(html.contains("No scores yet. Start your journey today!"));

        let html = render_index(&reduce(state, Event::ViewSwitched(ViewMode::Friend)));
        assert!(html.contains("Waiting for scores..."));
        assert!(!html.contains("Start your journey today!"));
    }

    #[test]
    fn save_button_is_disabled_while_saving() {
        let state = reduce(signed_in(vec![]), Event::AddOpened);
        let state = reduce(state, Event::SubmitStarted(crate::models::ScoreDraft::default()));
        let html = render_index(&state);
        assert!(html.contains(r#"<button class="btn-save" type="submit" disabled>Save Score</button>"#));
    }
}
