// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::refresh_service::{RefreshReport, RefreshService};
use crate::domain::series::Series;
use chrono::Utc;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tokio::task::JoinError;

/// The single writer's view: the current series and the simulation rng.
pub struct Session {
    pub series: Series,
    pub rng: StdRng,
}

pub struct AppState {
    pub refresh_service: RefreshService,
    pub dashboard_service: DashboardService,
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new(
        refresh_service: RefreshService,
        dashboard_service: DashboardService,
        session: Session,
    ) -> Self {
        Self {
            refresh_service,
            dashboard_service,
            session: Mutex::new(session),
        }
    }

    /// Run one refresh cycle under the session lock.
    ///
    /// The cycle persists with blocking file I/O, so it runs on the blocking pool. The session
    /// is only replaced once the cycle completes.
    pub async fn refresh(&self) -> Result<RefreshReport, JoinError> {
        let mut session = self.session.lock().await;
        let service = self.refresh_service.clone();
        let series = session.series.clone();
        let mut rng = session.rng.clone();

        let (next, report, rng) = tokio::task::spawn_blocking(move || {
            let (next, report) = service.refresh(series, Utc::now(), &mut rng);
            (next, report, rng)
        })
        .await?;

        *session = Session { series: next, rng };
        Ok(report)
    }

    pub async fn reset(&self) -> Result<(usize, Option<String>), JoinError> {
        let mut session = self.session.lock().await;
        let service = self.refresh_service.clone();
        let mut rng = session.rng.clone();

        let (next, warning, rng) = tokio::task::spawn_blocking(move || {
            let (next, warning) = service.reset(Utc::now(), &mut rng);
            (next, warning, rng)
        })
        .await?;

        let rows = next.len();
        *session = Session { series: next, rng };
        Ok((rows, warning))
    }
}
