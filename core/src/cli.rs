use std::fmt::Write as _;

use crate::types::{Outcome, SessionReport};

fn opt(v: Option<f64>, dp: usize) -> String {
    match v {
        Some(x) => format!("{x:.dp$}"),
        None => "-".to_string(),
    }
}

fn skipped<T>(out: &mut String, o: &Outcome<T>) -> bool {
    if let Outcome::Skipped(reason) = o {
        let _ = writeln!(out, "  insufficient data: {reason}");
        return true;
    }
    false
}

/// Plain-text rendering of a report, one block per panel.
pub fn render_report(r: &SessionReport) -> String {
    let mut out = String::new();
    let w = &mut out;

    let _ = writeln!(w, "--- Summary ---");
    if !skipped(w, &r.summary) {
        if let Some(s) = r.summary.value() {
            let _ = writeln!(w, "Samples: {}", s.samples);
            let _ = writeln!(w, "Duration (min): {:.1}", s.duration_s / 60.0);
            let km = s.total_distance_m.map(|d| d / 1000.0);
            let _ = writeln!(w, "Total distance (km): {}", opt(km, 2));
            let _ = writeln!(w, "Elevation gain (m): {}", opt(s.elevation_gain_m, 0));
            let _ = writeln!(w, "Avg HR (bpm): {}", opt(s.mean_heart_rate, 0));
            let _ = writeln!(w, "Avg cadence: {}", opt(s.mean_cadence, 0));
            let _ = writeln!(w, "Avg power: {} ({:?})", opt(s.mean_power, 1), s.power_source);
        }
    }
    for e in &r.unavailable_metrics {
        let _ = writeln!(w, "  {e}");
    }

    let _ = writeln!(w, "--- Stability (variance) ---");
    if !skipped(w, &r.stability) {
        if let Some(s) = r.stability.value() {
            for (metric, var) in &s.variances {
                let _ = writeln!(w, "{metric}: {var:.2}");
            }
            for metric in &s.unavailable {
                let _ = writeln!(w, "{metric}: unavailable");
            }
        }
    }

    let _ = writeln!(w, "--- Performance by window ---");
    if !skipped(w, &r.windows) {
        if let Some(c) = r.windows.value() {
            for ws in &c.windows {
                let _ = writeln!(
                    w,
                    "{:<13} speed {:>6} km/h  eff {:>6}  cadence {:>5}",
                    ws.label,
                    opt(ws.mean_speed_kmh, 2),
                    opt(ws.mean_hr_efficiency, 3),
                    opt(ws.mean_cadence, 1)
                );
            }
        }
    }
    if let Some(d) = r.efficiency_drop.value() {
        let _ = writeln!(w, "Efficiency drop (first vs last): {d:.3} km/h per bpm");
    }

    let _ = writeln!(w, "--- Best window ---");
    if !skipped(w, &r.best_window) {
        if let Some(b) = r.best_window.value() {
            let _ = writeln!(
                w,
                "Top {:.0}% speed (>= {:.2} km/h) around {:.1} min",
                (1.0 - b.quantile) * 100.0,
                b.threshold_speed_kmh,
                b.mean_elapsed_s / 60.0
            );
        }
    }

    let _ = writeln!(w, "--- Terrain ---");
    if !skipped(w, &r.terrain) {
        if let Some(t) = r.terrain.value() {
            for c in &t.classes {
                let _ = writeln!(
                    w,
                    "{:?}: {} samples, avg HR {}",
                    c.class,
                    c.samples,
                    opt(c.mean_heart_rate, 1)
                );
            }
        }
    }

    let _ = writeln!(w, "--- Early vs late climbs ---");
    if !skipped(w, &r.climbs) {
        if let Some(c) = r.climbs.value() {
            for (name, p) in [("early", &c.early), ("late", &c.late)] {
                let _ = writeln!(
                    w,
                    "{name}: {} samples, HR {}, cadence {}, speed {}",
                    p.samples,
                    opt(p.mean_heart_rate, 1),
                    opt(p.mean_cadence, 1),
                    opt(p.mean_speed_kmh, 2)
                );
            }
        }
    }

    let _ = writeln!(w, "--- HR trend ---");
    if !skipped(w, &r.fatigue) {
        if let Some(f) = r.fatigue.value() {
            let _ = writeln!(w, "{:?} ({:+.4} bpm/s)", f.direction, f.slope_bpm_per_s);
        }
    }

    let _ = writeln!(w, "--- Time in zone ({}) ---", r.zone_table);
    if !skipped(w, &r.time_in_zone) {
        if let Some(z) = r.time_in_zone.value() {
            for share in &z.zones {
                let _ = writeln!(
                    w,
                    "{:<13} {:>5} samples {:>5.1}%  eff {}",
                    share.label,
                    share.samples,
                    share.share_pct,
                    opt(share.mean_hr_efficiency, 3)
                );
            }
            let _ = writeln!(w, "unclassified: {}", z.unclassified_samples);
        }
    }

    let _ = writeln!(w, "--- What-if ---");
    if !skipped(w, &r.simulation) {
        if let Some(s) = r.simulation.value() {
            let _ = writeln!(
                w,
                "Projected ({:?}): {:.2} min vs actual {:.2} min",
                s.model,
                s.projected_finish_s / 60.0,
                s.actual_finish_s / 60.0
            );
        }
    }

    out
}

pub fn print_session_report(report: &SessionReport) {
    print!("{}", render_report(report));
}
