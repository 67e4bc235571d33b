use crate::infra::{
    default_scoring_config, demo_fixture, parse_date, InMemoryShortlistStore, DEMO_SEEKER,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use jobmatch::error::AppError;
use jobmatch::workflows::matching::{
    JobId, MatchingService, SessionView, ShortlistStore, StoreError, UserId, WriteOutcome,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct RecommendArgs {
    /// Fixture seeker to rank jobs for
    #[arg(long, default_value = "ada")]
    pub(crate) user: String,
    /// Override the ranking date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the demo date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Fail the first shortlist write to walk the retry path
    #[arg(long)]
    pub(crate) flaky_shortlist: bool,
}

/// Print the ranked batch the engine would serve a fixture seeker.
pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let fixture = demo_fixture();
    let service = MatchingService::new(
        fixture.catalog,
        fixture.directory,
        fixture.shortlists,
        fixture.applications,
        default_scoring_config(),
    );

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let batch = service.recommend(&UserId(args.user.clone()), today)?;

    println!("Ranked recommendations for {} on {today}:", args.user);
    if batch.is_empty() {
        println!("  (no open postings match)");
    }
    for (position, entry) in batch.jobs.iter().enumerate() {
        println!(
            "  {:>2}. [{}] {} (score {})",
            position + 1,
            entry.job.id,
            entry.job.title,
            entry.score
        );
        for component in &entry.components {
            println!("      {:+} {}", component.score, component.notes);
        }
    }

    Ok(())
}

/// Shortlist store that rejects a configured number of writes before
/// recovering, so the demo can walk the swipe retry path.
struct FlakyShortlistStore {
    inner: Arc<InMemoryShortlistStore>,
    failures_remaining: AtomicUsize,
}

impl ShortlistStore for FlakyShortlistStore {
    fn jobs(&self, user: &UserId) -> Result<Vec<JobId>, StoreError> {
        self.inner.jobs(user)
    }

    fn add(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining
                .store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable(
                "simulated shortlist outage".to_string(),
            ));
        }
        self.inner.add(user, job)
    }

    fn remove(&self, user: &UserId, job: &JobId) -> Result<WriteOutcome, StoreError> {
        self.inner.remove(user, job)
    }
}

fn print_session(event: &str, view: &SessionView) {
    match &view.presented {
        Some(entry) => println!(
            "{event}: phase {}, presenting [{}] {} ({} remaining)",
            view.phase, entry.job.id, entry.job.title, view.remaining
        ),
        None => {
            let detail = view
                .failure
                .as_deref()
                .map(|message| format!(" ({message})"))
                .unwrap_or_default();
            println!("{event}: phase {}{detail}", view.phase);
        }
    }
}

/// End-to-end walkthrough: fetch a batch, swipe through it, shortlist a job,
/// and file an application, narrating every transition.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let fixture = demo_fixture();
    let shortlists = Arc::new(FlakyShortlistStore {
        inner: fixture.shortlists,
        failures_remaining: AtomicUsize::new(usize::from(args.flaky_shortlist)),
    });
    let service = MatchingService::new(
        fixture.catalog,
        fixture.directory,
        shortlists,
        fixture.applications,
        default_scoring_config(),
    );
    let ada = UserId(DEMO_SEEKER.to_string());

    println!("== Job board swipe demo ({today}) ==");
    let batch = service.recommend(&ada, today)?;
    println!("Recommendation batch for {DEMO_SEEKER}: {} job(s)", batch.len());
    for entry in &batch.jobs {
        println!("  [{}] {} (score {})", entry.job.id, entry.job.title, entry.score);
    }

    let view = service.start_session(&ada, today)?;
    print_session("session started", &view);

    let view = service.skip(&ada)?;
    print_session("skipped the presented job", &view);

    match service.shortlist_presented(&ada) {
        Ok(view) => print_session("shortlisted the presented job", &view),
        Err(err) => {
            println!("shortlist write failed ({err}); the job stays presented, retrying once");
            let view = service.shortlist_presented(&ada)?;
            print_session("retry landed", &view);
        }
    }

    let shortlisted = service.shortlisted_jobs(&ada)?;
    println!("Shortlist now holds {} job(s):", shortlisted.len());
    for job in &shortlisted {
        println!("  [{}] {}", job.id, job.title);
    }

    if let Some(first) = shortlisted.first() {
        let outcome = service.submit_application(
            &ada,
            &first.id,
            today,
            Some("Excited to apply.".to_string()),
            Vec::new(),
        )?;
        println!("Application submit for [{}]: {outcome:?}", first.id);
        let repeat = service.submit_application(&ada, &first.id, today, None, Vec::new())?;
        println!("Duplicate submit is a no-op: {repeat:?}");
    }

    let applications = service.applications_for(&ada)?;
    println!("{} application(s) on file", applications.len());
    for application in &applications {
        println!("  [{}] {}", application.job, application.status.label());
    }

    Ok(())
}
