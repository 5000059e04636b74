//! Plain-text rendering of session snapshots and results.

use std::fmt::Write as _;

use tokio::sync::watch;

use quiz_core::model::Tone;
use quiz_core::time::format_duration;
use quiz_core::{SessionPhase, SessionSnapshot};
use services::{HistoryFilter, HistoryView, ResultView};
use services::results::{format_percentage, share_text};

/// Print every snapshot change until the sender goes away.
///
/// The whole screen is redrawn when anything besides the clock changes; the
/// clock alone is printed once a minute and during the last ten seconds.
pub async fn follow(mut snapshots: watch::Receiver<SessionSnapshot>) {
    let mut last: Option<SessionSnapshot> = None;
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        match &last {
            Some(prev) if without_clock(prev) == without_clock(&snapshot) => {
                if prev.remaining_secs != snapshot.remaining_secs && clock_worth_printing(&snapshot)
                {
                    println!("{}", clock_line(&snapshot));
                }
            }
            _ => print!("{}", screen(&snapshot)),
        }
        last = Some(snapshot);
        if snapshots.changed().await.is_err() {
            break;
        }
    }
}

fn without_clock(snapshot: &SessionSnapshot) -> SessionSnapshot {
    SessionSnapshot {
        remaining_secs: 0,
        elapsed_secs: 0,
        remaining_label: String::new(),
        time_tone: Tone::Success,
        ..snapshot.clone()
    }
}

fn clock_worth_printing(snapshot: &SessionSnapshot) -> bool {
    snapshot.phase == SessionPhase::Active
        && (snapshot.remaining_secs % 60 == 0 || snapshot.remaining_secs <= 10)
}

#[must_use]
pub fn clock_line(snapshot: &SessionSnapshot) -> String {
    format!(
        "Time left {} [{}]",
        snapshot.remaining_label,
        snapshot.time_tone.as_str()
    )
}

/// Full screen for one snapshot.
#[must_use]
pub fn screen(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    match snapshot.phase {
        SessionPhase::Loading => out.push_str("Loading quiz...\n"),
        SessionPhase::Failed => {
            let message = snapshot.error.as_deref().unwrap_or("Failed to load quiz");
            let _ = writeln!(out, "Error: {message}");
        }
        SessionPhase::Completed => out.push_str("Quiz submitted.\n"),
        SessionPhase::Active | SessionPhase::Submitting => attempt_screen(snapshot, &mut out),
    }
    out
}

fn attempt_screen(snapshot: &SessionSnapshot, out: &mut String) {
    let title = snapshot.title.as_deref().unwrap_or_default();
    let category = snapshot.category.as_deref().unwrap_or_default();
    let markers: String = snapshot
        .answered
        .iter()
        .enumerate()
        .map(|(i, answered)| match (i == snapshot.question_index, answered) {
            (true, _) => '>',
            (false, true) => '#',
            (false, false) => '.',
        })
        .collect();

    let _ = writeln!(out, "\n{title} ({category})");
    let _ = writeln!(
        out,
        "Question {} of {}  {}/{} answered  [{markers}]",
        snapshot.question_index + 1,
        snapshot.question_count,
        snapshot.answered_count,
        snapshot.question_count,
    );
    let _ = writeln!(out, "{}", clock_line(snapshot));

    if let Some(question) = &snapshot.question {
        let _ = writeln!(out, "\n{}", question.prompt);
        for option in &question.options {
            let mark = if option.selected { "(x)" } else { "( )" };
            let _ = writeln!(out, "  {mark} {}. {}", option.label, option.text);
        }
    }

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "\n! {error}");
    }

    if snapshot.submitting {
        out.push_str("\nSubmitting...\n");
    } else if let Some(unanswered) = snapshot.confirmation_pending {
        let _ = writeln!(
            out,
            "\n{unanswered} question(s) unanswered. Submit anyway? [y]es / [c]ancel"
        );
    } else {
        let mut hints = Vec::new();
        if !snapshot.is_first {
            hints.push("[p]rev");
        }
        if !snapshot.is_last {
            hints.push("[n]ext");
        }
        hints.extend(["[a <letter>] answer", "[j <n>] jump", "[s]ubmit", "[q]uit"]);
        let _ = writeln!(out, "\n{}", hints.join("  "));
    }
}

/// Result screen with breakdown, insights and history.
#[must_use]
pub fn result_screen(view: &ResultView) -> String {
    let result = &view.result;
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", result.quiz.title);
    if !result.quiz.category.is_empty() {
        let _ = writeln!(out, "{}", result.quiz.category);
    }
    let _ = writeln!(
        out,
        "Score: {}% [{}]  {}",
        format_percentage(result.percentage),
        view.tone.as_str(),
        view.performance
    );
    let _ = writeln!(
        out,
        "Correct {}  Incorrect {}  Total {}",
        result.correct_answers,
        result.incorrect_answers(),
        result.total_questions
    );
    let _ = writeln!(
        out,
        "Time spent {}  Attempt #{}",
        view.time_spent_label, result.attempt_number
    );

    if let Some(insights) = &view.insights {
        let _ = writeln!(
            out,
            "Best {}%  Attempts {}  Change {}",
            format_percentage(insights.best_score),
            insights.total_attempts,
            insights.improvement_label()
        );
    }

    if !result.detailed_results.is_empty() {
        out.push_str("\nQuestions\n");
        for (i, outcome) in result.detailed_results.iter().enumerate() {
            let mark = if outcome.is_correct { '+' } else { 'x' };
            let _ = writeln!(out, "  {}. [{mark}] {}", i + 1, outcome.question);
            let answer = outcome.user_answer.as_deref().unwrap_or("(no answer)");
            let _ = write!(out, "       your answer: {answer}");
            match outcome.correct_answer.as_deref() {
                Some(correct) if !outcome.is_correct => {
                    let _ = writeln!(out, "  correct: {correct}");
                }
                _ => out.push('\n'),
            }
        }
    }

    if !view.history.is_empty() {
        out.push_str("\nHistory\n");
        for row in &view.history {
            let _ = writeln!(
                out,
                "  #{:<3} {:>7} [{}]  {}  {}",
                row.attempt_number,
                row.percentage_label,
                row.tone.as_str(),
                row.time_spent_label,
                row.completed_on.as_deref().unwrap_or("-"),
            );
        }
    }

    let _ = writeln!(out, "\n{}", share_text(result));
    out
}

/// History page with dashboard stats and pagination footer.
#[must_use]
pub fn history_screen(view: &HistoryView) -> String {
    let mut out = String::new();
    out.push_str("\nQuiz history\n");

    let Some(stats) = &view.stats else {
        out.push_str("No quiz attempts yet.\n");
        return out;
    };
    let _ = writeln!(
        out,
        "Quizzes {}  Average {}% [{}]  High {}%  Time {}",
        stats.total_quizzes,
        format_percentage(stats.average_score),
        stats.average_tone().as_str(),
        format_percentage(stats.high_score),
        format_duration(u32::try_from(stats.total_time_secs).unwrap_or(u32::MAX)),
    );
    if view.filter == HistoryFilter::HighScores {
        out.push_str("Showing scores of 80% and above\n");
    }

    out.push('\n');
    if view.rows.is_empty() {
        out.push_str("  (no matching attempts on this page)\n");
    }
    for row in &view.rows {
        let _ = writeln!(
            out,
            "  {:>7} [{}]  {} ({})  #{}  {}  {}  id {}",
            row.percentage_label,
            row.tone.as_str(),
            row.title,
            row.category,
            row.attempt_number,
            row.time_spent_label,
            row.completed_on.as_deref().unwrap_or("-"),
            row.attempt_id,
        );
    }

    let pagination = &view.pagination;
    if pagination.total_pages > 1 {
        let (first, last) = view.showing();
        let _ = writeln!(
            out,
            "\nShowing {first} - {last} of {} attempts  (page {} of {}{}{})",
            pagination.total_attempts,
            pagination.current_page,
            pagination.total_pages,
            if pagination.has_prev { ", --page for previous" } else { "" },
            if pagination.has_next { ", more with --page" } else { "" },
        );
    }
    out
}
