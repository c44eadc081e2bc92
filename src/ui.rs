use crate::models::TodaySummary;
use crate::notify::NotificationBoard;

pub fn render_index(summary: &TodaySummary, board: &NotificationBoard) -> String {
    let next_up = summary
        .next_up
        .as_ref()
        .map(|med| format!("{} · {}", escape(&med.name), escape(&med.dose)))
        .unwrap_or_else(|| "All caught up ✨".to_string());
    let alerts = if board.is_empty() {
        "<li class=\"muted\">Nothing pending</li>".to_string()
    } else {
        board
            .iter()
            .map(|alert| {
                format!(
                    "<li class=\"{:?}\"><strong>{}</strong><span>{}</span></li>",
                    alert.kind,
                    escape(&alert.message),
                    escape(&alert.subtext)
                )
            })
            .collect()
    };

    let latest_weight = summary
        .latest_weight
        .map(|weight| format!("{weight:.1} kg"))
        .unwrap_or_else(|| "none yet".to_string());

    fill(
        INDEX_HTML,
        &[
            ("DATE", summary.date.clone()),
            ("SCORE", summary.score.to_string()),
            ("CALORIES", format!("{:.0}", summary.calories)),
            ("CALORIE_GOAL", format!("{:.0}", summary.goals.calories)),
            ("PROTEIN", format!("{:.0}", summary.protein)),
            ("STEPS", summary.steps.to_string()),
            ("BURNED", summary.calories_burned.to_string()),
            ("LATEST_WEIGHT", latest_weight),
            ("MOTIVATION", summary.motivation.to_string()),
            ("NEXT_UP", next_up),
            ("MISSED", board.missed_count.to_string()),
            ("ALERTS", alerts),
        ],
    )
}

/// Substitutes `{{NAME}}` placeholders in one pass, so inserted text is never rescanned.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let found = tail.find("}}").and_then(|end| {
            values
                .iter()
                .find(|(name, _)| *name == &tail[..end])
                .map(|(_, value)| (value, end))
        });
        match found {
            Some((value, end)) => {
                out.push_str(value);
                rest = &tail[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Ritual Diary</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #fdf2f5;
      --bg-2: #f7c8d6;
      --ink: #3a2b31;
      --accent: #e0719b;
      --accent-2: #5b3a4a;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(91, 58, 74, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe4ec 60%, #fbf3f6 100%);
      color: var(--ink);
      font-family: 'Space Grotesk', system-ui, sans-serif;
      padding: 32px 16px 64px;
    }

    main {
      max-width: 880px;
      margin: 0 auto;
      display: grid;
      gap: 18px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
    }

    h1 {
      font-family: 'Fraunces', serif;
      margin: 0;
      font-size: 2.2rem;
    }

    .card {
      background: var(--card);
      border-radius: 22px;
      box-shadow: var(--shadow);
      padding: 20px 22px;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .label {
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      opacity: 0.65;
    }

    .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .score {
      color: var(--accent);
      font-size: 2.6rem;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    li {
      display: flex;
      justify-content: space-between;
      gap: 12px;
      align-items: center;
    }

    li.Missed strong {
      color: #c2334d;
    }

    .muted {
      opacity: 0.6;
    }

    button {
      border: none;
      border-radius: 999px;
      background: var(--accent-2);
      color: white;
      padding: 6px 14px;
      font: inherit;
      cursor: pointer;
    }

    button.done {
      background: var(--accent);
    }

    button:disabled {
      opacity: 0.4;
      cursor: not-allowed;
    }

    form {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      margin-top: 12px;
    }

    input {
      border: 1px solid rgba(91, 58, 74, 0.2);
      border-radius: 12px;
      padding: 8px 10px;
      font: inherit;
      flex: 1 1 120px;
    }

    .bars {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      align-items: end;
      gap: 8px;
      height: 140px;
    }

    .bar {
      background: var(--accent);
      border-radius: 8px 8px 2px 2px;
      min-height: 2px;
    }

    .bar-labels {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      text-align: center;
      font-size: 0.8rem;
      opacity: 0.7;
    }

    #status {
      min-height: 1.2em;
      font-size: 0.85rem;
    }

    #status.error {
      color: #c2334d;
    }

    #oracle-answer {
      white-space: pre-wrap;
      margin-top: 10px;
    }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>Ritual Diary</h1>
      <div>
        <span id="date" class="label">{{DATE}}</span>
        <span id="clock" class="label"></span>
      </div>
    </header>

    <section class="card stats">
      <div><div class="label">Score</div><div id="score" class="value score">{{SCORE}}</div></div>
      <div><div class="label">Calories</div><div class="value"><span id="calories">{{CALORIES}}</span> / <span id="calorie-goal">{{CALORIE_GOAL}}</span></div></div>
      <div><div class="label">Protein</div><div class="value"><span id="protein">{{PROTEIN}}</span>g</div></div>
      <div><div class="label">Steps</div><div id="steps" class="value">{{STEPS}}</div></div>
      <div><div class="label">Burned</div><div class="value"><span id="burned">{{BURNED}}</span> kcal</div></div>
    </section>

    <section class="card">
      <div class="label">Next up</div>
      <div id="next-up" class="value">{{NEXT_UP}}</div>
      <div id="motivation" class="muted">{{MOTIVATION}}</div>
    </section>

    <section class="card">
      <div class="label">Notifications · <span id="missed">{{MISSED}}</span> missed</div>
      <ul id="alerts">{{ALERTS}}</ul>
    </section>

    <section class="card">
      <div class="label">Today's rituals</div>
      <ul id="rituals"></ul>
    </section>

    <section class="card">
      <div class="label">Routine</div>
      <ul id="workouts"></ul>
    </section>

    <section class="card">
      <div class="label">Log</div>
      <form id="meal-form">
        <input name="name" placeholder="Meal" required />
        <input name="calories" type="number" min="0" placeholder="kcal" required />
        <input name="protein" type="number" min="0" placeholder="protein g" />
        <button type="submit">Add meal</button>
      </form>
      <form id="steps-form">
        <input name="steps" type="number" min="0" placeholder="Steps today" required />
        <button type="submit">Save steps</button>
      </form>
      <form id="weight-form">
        <input name="weight" type="number" step="0.1" min="0" placeholder="Weight kg" required />
        <button type="submit">Save weight</button>
      </form>
      <div class="muted">Latest recorded: <span id="latest-weight">{{LATEST_WEIGHT}}</span></div>
      <div id="status"></div>
    </section>

    <section class="card">
      <div class="label">Last 7 days · calories</div>
      <div id="bars" class="bars"></div>
      <div id="bar-labels" class="bar-labels"></div>
    </section>

    <section class="card">
      <div class="label">Ask the Oracle</div>
      <form id="oracle-form">
        <input name="question" placeholder="How much protein after a workout?" required />
        <button type="submit">Ask</button>
      </form>
      <div id="oracle-answer" class="muted"></div>
    </section>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    const statusEl = $('status');

    const setStatus = (message, kind) => {
      statusEl.textContent = message;
      statusEl.className = kind || '';
    };

    const api = async (path, options = {}) => {
      const res = await fetch(path, {
        headers: { 'content-type': 'application/json' },
        ...options,
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const text = (value) => document.createTextNode(value);

    const tick = () => {
      $('clock').textContent = new Date().toLocaleTimeString([], { hour: '2-digit', minute: '2-digit', second: '2-digit' });
    };

    const renderToday = (today) => {
      $('date').textContent = today.date;
      $('score').textContent = today.score;
      $('calories').textContent = Math.round(today.calories);
      $('calorie-goal').textContent = Math.round(today.goals.calories);
      $('protein').textContent = Math.round(today.protein);
      $('steps').textContent = today.steps;
      $('burned').textContent = today.calories_burned;
      $('latest-weight').textContent = today.latest_weight == null
        ? 'none yet'
        : `${today.latest_weight.toFixed(1)} kg`;
      $('motivation').textContent = today.motivation;
      $('next-up').textContent = today.next_up
        ? `${today.next_up.name} · ${today.next_up.dose}`
        : 'All caught up ✨';
    };

    const renderBoard = (board) => {
      $('missed').textContent = board.missed_count;
      const list = $('alerts');
      list.replaceChildren();
      const alerts = [...board.missed, ...board.upcoming];
      if (alerts.length === 0) {
        const li = document.createElement('li');
        li.className = 'muted';
        li.append(text('Nothing pending'));
        list.append(li);
        return;
      }
      alerts.forEach((alert) => {
        const li = document.createElement('li');
        li.className = alert.kind === 'missed' ? 'Missed' : 'Upcoming';
        const strong = document.createElement('strong');
        strong.append(text(alert.message));
        const span = document.createElement('span');
        span.append(text(alert.subtext));
        li.append(strong, span);
        list.append(li);
      });
    };

    const renderRituals = (rituals) => {
      const list = $('rituals');
      list.replaceChildren();
      rituals
        .filter((item) => item.state !== 'not_due')
        .forEach((item) => {
          const li = document.createElement('li');
          li.append(text(`${item.time_of_day} · ${item.name}`));
          const button = document.createElement('button');
          button.textContent = item.state === 'completed' ? 'Done' : 'Mark';
          button.className = item.state === 'completed' ? 'done' : '';
          button.disabled = item.locked;
          button.addEventListener('click', () => {
            const base = item.is_medication ? '/api/meds' : '/api/skincare';
            api(`${base}/${item.id}/toggle`, { method: 'POST' })
              .then(refresh)
              .catch((err) => setStatus(err.message, 'error'));
          });
          li.append(button);
          list.append(li);
        });
    };

    const renderWorkouts = (plan) => {
      const list = $('workouts');
      list.replaceChildren();
      plan.exercises.forEach((task) => {
        const li = document.createElement('li');
        li.append(text(`${task.name} · ${task.reps}`));
        const button = document.createElement('button');
        button.textContent = task.completed ? 'Done' : 'Go';
        button.className = task.completed ? 'done' : '';
        button.addEventListener('click', () => {
          api(`/api/workouts/${task.id}/toggle`, { method: 'POST' })
            .then(refresh)
            .catch((err) => setStatus(err.message, 'error'));
        });
        li.append(button);
        list.append(li);
      });
    };

    const renderGraph = (points) => {
      const max = Math.max(1, ...points.map((point) => point.value));
      $('bars').replaceChildren(...points.map((point) => {
        const bar = document.createElement('div');
        bar.className = 'bar';
        bar.style.height = `${(point.value / max) * 100}%`;
        bar.title = `${point.date}: ${Math.round(point.value)} kcal`;
        return bar;
      }));
      $('bar-labels').replaceChildren(...points.map((point) => {
        const label = document.createElement('span');
        label.textContent = point.day;
        return label;
      }));
    };

    const refresh = async () => {
      const [today, rituals, plan, graph] = await Promise.all([
        api('/api/today'),
        api('/api/rituals'),
        api('/api/workouts'),
        api('/api/graph?metric=calories'),
      ]);
      renderToday(today);
      renderRituals(rituals);
      renderWorkouts(plan);
      renderGraph(graph);
    };

    const submit = (formId, handler) => {
      const form = $(formId);
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        const data = Object.fromEntries(new FormData(form));
        handler(data)
          .then(() => {
            form.reset();
            setStatus('Saved', 'ok');
            setTimeout(() => setStatus('', ''), 1200);
            return refresh();
          })
          .catch((err) => setStatus(err.message, 'error'));
      });
    };

    submit('meal-form', (data) => api('/api/meals', {
      method: 'POST',
      body: JSON.stringify({
        name: data.name,
        calories: Number(data.calories),
        protein: Number(data.protein || 0),
      }),
    }));

    submit('steps-form', (data) => api('/api/steps', {
      method: 'PUT',
      body: JSON.stringify({ steps: Number(data.steps) }),
    }));

    submit('weight-form', (data) => api('/api/weight', {
      method: 'POST',
      body: JSON.stringify({ weight: data.weight }),
    }));

    const oracleForm = $('oracle-form');
    oracleForm.addEventListener('submit', (event) => {
      event.preventDefault();
      const question = new FormData(oracleForm).get('question');
      $('oracle-answer').textContent = 'Consulting the stars...';
      api('/api/oracle/ask', { method: 'POST', body: JSON.stringify({ question }) })
        .then((res) => { $('oracle-answer').textContent = res.answer; })
        .catch((err) => { $('oracle-answer').textContent = err.message; });
    });

    const events = new EventSource('/api/notifications/stream');
    events.addEventListener('notifications', (event) => {
      renderBoard(JSON.parse(event.data));
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    tick();
    setInterval(tick, 1000);
    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Goals;

    fn summary() -> TodaySummary {
        TodaySummary {
            date: "2026-03-10".into(),
            score: 40,
            calories: 650.0,
            protein: 42.4,
            goals: Goals::default(),
            steps: 5000,
            calories_burned: 200,
            latest_weight: Some(70.4),
            surgery_mode: false,
            next_up: None,
            compliance: 0.0,
            motivation: "Halfway there",
        }
    }

    #[test]
    fn fills_every_placeholder() {
        let html = render_index(&summary(), &NotificationBoard::default());
        assert!(!html.contains("{{"));
        assert!(html.contains(">40<"));
        assert!(html.contains("All caught up"));
        assert!(html.contains("Nothing pending"));
    }

    #[test]
    fn inserted_text_is_not_expanded_again() {
        let mut summary = summary();
        summary.next_up = Some(crate::models::Medication {
            id: "m1".into(),
            name: "{{ALERTS}}".into(),
            dose: "{{SCORE}}".into(),
            kind: Default::default(),
            frequency: Default::default(),
            time_of_day: Default::default(),
            instructions: None,
            warning_label: None,
            surgery_safe: true,
            last_taken_date: None,
        });
        let html = render_index(&summary, &NotificationBoard::default());
        assert!(html.contains("{{ALERTS}} · {{SCORE}}"));
        assert_eq!(html.matches("Nothing pending").count(), 1);
        assert!(html.contains("70.4 kg"));
    }

    #[test]
    fn escapes_user_text() {
        assert_eq!(escape("<b>\"Fish\" & 'Oil'</b>"), "&lt;b&gt;&quot;Fish&quot; &amp; &#39;Oil&#39;&lt;/b&gt;");
    }
}
