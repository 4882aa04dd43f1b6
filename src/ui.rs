use crate::models::{Dataset, Variation};

pub fn render_index(dataset: &Dataset) -> String {
    INDEX_HTML.replace(
        "{{VARIATION_OPTIONS}}",
        &variation_options(&dataset.variations),
    )
}

fn variation_options(variations: &[Variation]) -> String {
    let mut options = String::from(r#"<option value="all" selected>All variations</option>"#);
    for variation in variations {
        options.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            escape_html(&variation.key()),
            escape_html(&variation.name)
        ));
    }
    options
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" data-theme="light">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>A/B Chart</title>
  <style>
    :root {
      --bg-1: #f6f7fb;
      --bg-2: #e8ecf7;
      --ink: #25283b;
      --muted: #6a6f85;
      --card: #ffffff;
      --card-border: rgba(37, 40, 59, 0.08);
      --grid: rgba(37, 40, 59, 0.12);
      --accent: #5a5fc7;
      --shadow: 0 18px 48px rgba(37, 40, 59, 0.12);
    }

    [data-theme="dark"] {
      --bg-1: #151726;
      --bg-2: #1d2033;
      --ink: #e8eaf6;
      --muted: #9aa0b8;
      --card: #1f2235;
      --card-border: rgba(232, 234, 246, 0.1);
      --grid: rgba(232, 234, 246, 0.14);
      --accent: #8f94e8;
      --shadow: 0 18px 48px rgba(0, 0, 0, 0.4);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg-1), var(--bg-2));
      color: var(--ink);
      font-family: "Segoe UI", "Helvetica Neue", Arial, sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
      transition: background 200ms ease, color 200ms ease;
    }

    .app {
      width: min(920px, 100%);
      background: var(--card);
      border: 1px solid var(--card-border);
      border-radius: 22px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    header h1 {
      margin: 0;
      font-size: clamp(1.6rem, 3vw, 2.2rem);
    }

    header .subtitle {
      margin: 6px 0 0;
      color: var(--muted);
      font-size: 0.95rem;
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      gap: 18px;
      align-items: flex-end;
    }

    .control {
      display: grid;
      gap: 6px;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .control select,
    .control button {
      font-size: 0.95rem;
      letter-spacing: normal;
      text-transform: none;
      color: var(--ink);
      background: var(--card);
      border: 1px solid var(--card-border);
      border-radius: 10px;
      padding: 8px 12px;
      min-width: 130px;
      cursor: pointer;
    }

    .control select:focus,
    .control button:focus {
      outline: 2px solid var(--accent);
      outline-offset: 1px;
    }

    .chart-card {
      background: var(--card);
      border: 1px solid var(--card-border);
      border-radius: 16px;
      padding: 16px;
      display: grid;
      gap: 12px;
    }

    #chart {
      width: 100%;
      height: 300px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke-width: 2;
    }

    .chart-point {
      fill: var(--card);
      stroke-width: 2;
    }

    .chart-grid {
      stroke: var(--grid);
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      font-size: 0.9rem;
    }

    .legend-item {
      display: inline-flex;
      align-items: center;
      gap: 6px;
    }

    .legend-swatch {
      width: 12px;
      height: 12px;
      border-radius: 3px;
      display: inline-block;
    }

    .metrics {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: var(--card);
      border: 1px solid var(--card-border);
      border-radius: 14px;
      padding: 16px;
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
    }

    .status {
      font-size: 0.95rem;
      color: var(--muted);
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #d64545;
    }

    @media (max-width: 640px) {
      .app {
        padding: 22px;
      }
      .control select,
      .control button {
        min-width: 110px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>A/B Chart</h1>
      <p class="subtitle">Conversion rate per variation over time.</p>
    </header>

    <section class="controls">
      <label class="control">Variation
        <select id="variation">{{VARIATION_OPTIONS}}</select>
      </label>
      <label class="control">Period
        <select id="range">
          <option value="day" selected>Day</option>
          <option value="week">Week</option>
        </select>
      </label>
      <label class="control">Line type
        <select id="line-type">
          <option value="monotone" selected>Monotone</option>
          <option value="linear">Linear</option>
          <option value="step">Step</option>
          <option value="stepBefore">Step before</option>
          <option value="stepAfter">Step after</option>
        </select>
      </label>
      <div class="control">Theme
        <button id="theme-toggle" type="button">Day</button>
      </div>
    </section>

    <section class="chart-card">
      <svg id="chart" viewBox="0 0 720 300" aria-label="Conversion rate chart" role="img"></svg>
      <div class="legend" id="legend"></div>
    </section>

    <section class="metrics">
      <div class="stat">
        <span class="label">Visits</span>
        <span class="value" id="summary-visits">0</span>
      </div>
      <div class="stat">
        <span class="label">Conversions</span>
        <span class="value" id="summary-conversions">0</span>
      </div>
      <div class="stat">
        <span class="label">Conversion rate</span>
        <span class="value" id="summary-rate">0.00%</span>
      </div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const chartEl = document.getElementById('chart');
    const legendEl = document.getElementById('legend');
    const statusEl = document.getElementById('status');
    const variationEl = document.getElementById('variation');
    const rangeEl = document.getElementById('range');
    const lineTypeEl = document.getElementById('line-type');
    const themeBtn = document.getElementById('theme-toggle');
    const visitsEl = document.getElementById('summary-visits');
    const conversionsEl = document.getElementById('summary-conversions');
    const rateEl = document.getElementById('summary-rate');

    let chartData = null;

    const esc = (value) => String(value).replace(/[&<>"']/g, (ch) => ({
      '&': '&amp;',
      '<': '&lt;',
      '>': '&gt;',
      '"': '&quot;',
      "'": '&#39;'
    }[ch]));

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const toggleTheme = () => {
      const root = document.documentElement;
      const next = root.dataset.theme === 'dark' ? 'light' : 'dark';
      root.dataset.theme = next;
      themeBtn.textContent = next === 'dark' ? 'Night' : 'Day';
    };

    const fetchJson = async (url) => {
      const res = await fetch(url);
      if (!res.ok) {
        const body = await res.text();
        throw new Error(body || ('Request failed with status ' + res.status));
      }
      return res.json();
    };

    const buildPath = (pts, type) => {
      if (type === 'monotone') {
        return monotonePath(pts);
      }
      const fmt = (p) => p.x.toFixed(2) + ' ' + p.y.toFixed(2);
      let d = 'M ' + fmt(pts[0]);
      for (let i = 1; i < pts.length; i += 1) {
        const prev = pts[i - 1];
        const p = pts[i];
        if (type === 'stepAfter') {
          d += ' L ' + p.x.toFixed(2) + ' ' + prev.y.toFixed(2) + ' L ' + fmt(p);
        } else if (type === 'stepBefore') {
          d += ' L ' + prev.x.toFixed(2) + ' ' + p.y.toFixed(2) + ' L ' + fmt(p);
        } else if (type === 'step') {
          const mid = ((prev.x + p.x) / 2).toFixed(2);
          d += ' L ' + mid + ' ' + prev.y.toFixed(2) + ' L ' + mid + ' ' + p.y.toFixed(2) + ' L ' + fmt(p);
        } else {
          d += ' L ' + fmt(p);
        }
      }
      return d;
    };

    // Monotone cubic interpolation (Fritsch-Carlson tangents), so the
    // smoothed line never overshoots the data.
    const monotonePath = (pts) => {
      const n = pts.length;
      if (n < 3) {
        return buildPath(pts, 'linear');
      }
      const dx = [];
      const m = [];
      for (let i = 0; i < n - 1; i += 1) {
        dx.push(pts[i + 1].x - pts[i].x);
        m.push((pts[i + 1].y - pts[i].y) / dx[i]);
      }
      const t = [m[0]];
      for (let i = 1; i < n - 1; i += 1) {
        t.push(m[i - 1] * m[i] <= 0 ? 0 : (m[i - 1] + m[i]) / 2);
      }
      t.push(m[n - 2]);
      for (let i = 0; i < n - 1; i += 1) {
        if (m[i] === 0) {
          t[i] = 0;
          t[i + 1] = 0;
          continue;
        }
        const a = t[i] / m[i];
        const b = t[i + 1] / m[i];
        const s = a * a + b * b;
        if (s > 9) {
          const scale = 3 / Math.sqrt(s);
          t[i] = scale * a * m[i];
          t[i + 1] = scale * b * m[i];
        }
      }
      let d = 'M ' + pts[0].x.toFixed(2) + ' ' + pts[0].y.toFixed(2);
      for (let i = 0; i < n - 1; i += 1) {
        const c1x = pts[i].x + dx[i] / 3;
        const c1y = pts[i].y + (t[i] * dx[i]) / 3;
        const c2x = pts[i + 1].x - dx[i] / 3;
        const c2y = pts[i + 1].y - (t[i + 1] * dx[i]) / 3;
        d += ' C ' + c1x.toFixed(2) + ' ' + c1y.toFixed(2) + ' ' +
          c2x.toFixed(2) + ' ' + c2y.toFixed(2) + ' ' +
          pts[i + 1].x.toFixed(2) + ' ' + pts[i + 1].y.toFixed(2);
      }
      return d;
    };

    const renderLegend = (series) => {
      legendEl.innerHTML = series.map((s) =>
        '<span class="legend-item"><span class="legend-swatch" style="background:' +
        esc(s.color) + '"></span>' + esc(s.name) + '</span>'
      ).join('');
    };

    const renderChart = () => {
      if (!chartData) {
        return;
      }
      const points = chartData.points;
      const series = chartData.series;
      renderLegend(series);

      let min = Infinity;
      let max = -Infinity;
      points.forEach((p) => {
        series.forEach((s) => {
          const value = p[s.key];
          if (typeof value === 'number') {
            min = Math.min(min, value);
            max = Math.max(max, value);
          }
        });
      });

      if (!points.length || min === Infinity) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data</text>';
        return;
      }

      min = Math.max(0, min);
      if (min === max) {
        min = Math.max(0, min - 1);
        max += 1;
      }

      const width = 720;
      const height = 300;
      const paddingX = 52;
      const paddingY = 36;
      const top = 20;

      const xStep = points.length > 1 ? (width - paddingX * 2) / (points.length - 1) : 0;
      const x = (index) => paddingX + index * xStep;
      const scaleY = (height - top - paddingY) / (max - min);
      const y = (value) => height - paddingY - (value - min) * scaleY;

      const ticks = 4;
      let grid = '';
      for (let i = 0; i <= ticks; i += 1) {
        const value = min + ((max - min) * i) / ticks;
        const yPos = y(value);
        grid += '<line class="chart-grid" x1="' + paddingX + '" y1="' + yPos +
          '" x2="' + (width - paddingX) + '" y2="' + yPos + '" />';
        grid += '<text class="chart-label" x="' + (paddingX - 10) + '" y="' + (yPos + 4) +
          '" text-anchor="end">' + value.toFixed(1) + '%</text>';
      }

      const labelEvery = Math.max(1, Math.ceil(points.length / 10));
      const xLabels = points.map((p, i) => {
        if (i % labelEvery !== 0) {
          return '';
        }
        return '<text class="chart-label" x="' + x(i) + '" y="' + (height - paddingY + 18) +
          '" text-anchor="middle">' + esc(p.date.slice(5)) + '</text>';
      }).join('');

      let shapes = '';
      series.forEach((s) => {
        const segments = [];
        let current = [];
        points.forEach((p, i) => {
          const value = p[s.key];
          if (typeof value === 'number') {
            current.push({ x: x(i), y: y(value), date: p.date, value });
          } else if (current.length) {
            segments.push(current);
            current = [];
          }
        });
        if (current.length) {
          segments.push(current);
        }

        segments.forEach((segment) => {
          if (segment.length > 1) {
            shapes += '<path class="chart-line" stroke="' + esc(s.color) + '" d="' +
              buildPath(segment, lineTypeEl.value) + '" />';
          }
          segment.forEach((pt) => {
            shapes += '<circle class="chart-point" stroke="' + esc(s.color) + '" cx="' +
              pt.x.toFixed(2) + '" cy="' + pt.y.toFixed(2) + '" r="3"><title>' +
              esc(s.name) + ' | ' + esc(pt.date) + ' | ' + pt.value.toFixed(2) + '%</title></circle>';
          });
        });
      });

      chartEl.innerHTML = grid + xLabels + shapes;
    };

    const loadChart = async () => {
      const params = 'variation=' + encodeURIComponent(variationEl.value) + '&range=' + rangeEl.value;
      chartData = await fetchJson('/api/chart?' + params);
      renderChart();
    };

    const loadSummary = async () => {
      const summary = await fetchJson('/api/summary?variation=' + encodeURIComponent(variationEl.value));
      visitsEl.textContent = summary.visits.toLocaleString();
      conversionsEl.textContent = summary.conversions.toLocaleString();
      rateEl.textContent = summary.rate.toFixed(2) + '%';
    };

    const refresh = () => {
      setStatus('Loading...', '');
      Promise.all([loadChart(), loadSummary()])
        .then(() => setStatus('', ''))
        .catch((err) => setStatus(err.message + ' (reload the page to retry)', 'error'));
    };

    variationEl.addEventListener('change', refresh);
    rangeEl.addEventListener('change', refresh);
    lineTypeEl.addEventListener('change', renderChart);
    themeBtn.addEventListener('click', toggleTheme);

    refresh();
  </script>
</body>
</html>
"#;
