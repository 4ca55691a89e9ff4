//! Poll timers and the loop that owns the dashboard.
//!
//! Fetches run as spawned tasks and report back over a channel. The loop
//! applies one [`Message`] at a time to the [`Dashboard`] and paints after
//! each, so responses never interleave even when several requests are in
//! flight.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use signage_core::{Dashboard, Surface, WeatherFeeds};
use signage_protocol::{
    EventsResponse, FleetResponse, TickerDoc, TickerResponse, WeatherKind, WeatherResponse,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::config::{DisplayZone, RefreshConfig};
use crate::error::FetchError;
use crate::source::{DataSource, Transport};

const CHANNEL_CAPACITY: usize = 64;

/// Work for the dashboard loop.
#[derive(Debug)]
pub enum Message {
    Events(Result<EventsResponse, FetchError>),
    Ticker(TickerDoc, Result<TickerResponse, FetchError>),
    Weather(WeatherKind, Result<WeatherResponse, FetchError>),
    WeatherPair(
        Result<WeatherResponse, FetchError>,
        Result<WeatherResponse, FetchError>,
    ),
    Fleet(Result<FleetResponse, FetchError>),
    /// The layout changed.
    Resize,
    /// Tear everything down and boot again.
    Reload,
}

/// Poll periods and one-shot delays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub calendar: Duration,
    pub ticker: Duration,
    pub fleet: Duration,
    pub settle: Duration,
    pub page_reload: Option<Duration>,
}

impl From<&RefreshConfig> for Schedule {
    fn from(refresh: &RefreshConfig) -> Self {
        Self {
            calendar: refresh.calendar(),
            ticker: refresh.ticker(),
            fleet: refresh.fleet(),
            settle: refresh.settle(),
            page_reload: refresh.page_reload(),
        }
    }
}

/// Sends [`Message::Resize`] and [`Message::Reload`] from outside the loop.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Message>,
}

impl SchedulerHandle {
    pub async fn resize(&self) {
        self.send(Message::Resize).await;
    }

    pub async fn reload(&self) {
        self.send(Message::Reload).await;
    }

    async fn send(&self, message: Message) {
        if self.tx.send(message).await.is_err() {
            tracing::debug!("scheduler has stopped");
        }
    }
}

fn every(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// The periodic timers. Boot polls happen immediately, so every timer's
/// first tick is one full period away.
struct Timers {
    calendar: Interval,
    tickers: Interval,
    fleet: Interval,
    reload: Option<Interval>,
}

impl Timers {
    fn new(schedule: &Schedule) -> Self {
        Self {
            calendar: every(schedule.calendar),
            tickers: every(schedule.ticker),
            fleet: every(schedule.fleet),
            reload: schedule.page_reload.map(every),
        }
    }

    fn reset(&mut self) {
        self.calendar.reset();
        self.tickers.reset();
        self.fleet.reset();
        if let Some(reload) = &mut self.reload {
            reload.reset();
        }
    }
}

pub struct RefreshScheduler<S: Surface, T> {
    dashboard: Dashboard<S>,
    source: Arc<DataSource<T>>,
    schedule: Schedule,
    zone: DisplayZone,
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<Message>,
}

impl<S, T> RefreshScheduler<S, T>
where
    S: Surface,
    T: Transport + 'static,
{
    pub fn new(
        dashboard: Dashboard<S>,
        source: DataSource<T>,
        schedule: Schedule,
        zone: DisplayZone,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            dashboard,
            source: Arc::new(source),
            schedule,
            zone,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard<S> {
        &self.dashboard
    }

    fn spawn<F>(&self, fetch: F)
    where
        F: Future<Output = Message> + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let message = fetch.await;
            if tx.send(message).await.is_err() {
                tracing::debug!("scheduler stopped before a fetch completed");
            }
        });
    }

    fn poll_calendar(&mut self) {
        self.dashboard.calendar_requested();
        let source = Arc::clone(&self.source);
        self.spawn(async move { Message::Events(source.fetch_events().await) });
    }

    fn poll_tickers(&self) {
        for doc in self.dashboard.ticker_docs() {
            let source = Arc::clone(&self.source);
            self.spawn(async move { Message::Ticker(doc, source.fetch_ticker(doc).await) });
        }
        match self.dashboard.weather_feeds() {
            WeatherFeeds::Off => {}
            WeatherFeeds::Combined => {
                let source = Arc::clone(&self.source);
                self.spawn(async move {
                    let (shop, jobs) = source.fetch_weather_pair().await;
                    Message::WeatherPair(shop, jobs)
                });
            }
            WeatherFeeds::Separate(kinds) => {
                for kind in kinds {
                    let source = Arc::clone(&self.source);
                    self.spawn(
                        async move { Message::Weather(kind, source.fetch_weather(kind).await) },
                    );
                }
            }
        }
    }

    fn poll_fleet(&self) {
        if !self.dashboard.wants_fleet() {
            return;
        }
        let source = Arc::clone(&self.source);
        self.spawn(async move { Message::Fleet(source.fetch_fleet_status().await) });
    }

    /// Status line plus an immediate poll of every feed the page shows.
    fn boot(&mut self) {
        self.dashboard.boot();
        self.poll_calendar();
        self.poll_tickers();
        self.poll_fleet();
        self.dashboard.paint();
    }

    fn apply(&mut self, message: Message) {
        match message {
            Message::Events(result) => match self.zone {
                DisplayZone::Local => self.dashboard.apply_events(result, &Local::now()),
                DisplayZone::Named(tz) => self
                    .dashboard
                    .apply_events(result, &Utc::now().with_timezone(&tz)),
            },
            Message::Ticker(doc, result) => self.dashboard.apply_ticker(doc, result),
            Message::Weather(kind, result) => self.dashboard.apply_weather(kind, result),
            Message::WeatherPair(shop, jobs) => self.dashboard.apply_weather_pair(shop, jobs),
            Message::Fleet(result) => self.dashboard.apply_fleet(result),
            Message::Resize => self.dashboard.on_resize(),
            Message::Reload => {
                self.dashboard.reload();
                self.dashboard.paint();
                self.boot();
            }
        }
        self.dashboard.paint();
    }

    /// Run until `shutdown` resolves, then hand back the dashboard.
    pub async fn run<F>(mut self, shutdown: F) -> Dashboard<S>
    where
        F: Future<Output = ()>,
    {
        let mut timers = Timers::new(&self.schedule);
        let settle = tokio::time::sleep(self.schedule.settle);
        tokio::pin!(settle, shutdown);
        let mut settled = false;

        tracing::info!(schedule = ?self.schedule, "dashboard starting");
        self.boot();

        loop {
            let reloaded = tokio::select! {
                biased;

                () = &mut shutdown => {
                    tracing::info!("shutting down");
                    break;
                }
                Some(message) = self.rx.recv() => {
                    let reloading = matches!(message, Message::Reload);
                    self.apply(message);
                    reloading
                }
                () = &mut settle, if !settled => {
                    settled = true;
                    self.dashboard.settle();
                    self.dashboard.paint();
                    false
                }
                _ = timers.calendar.tick() => {
                    self.poll_calendar();
                    self.dashboard.paint();
                    false
                }
                _ = timers.tickers.tick() => {
                    self.poll_tickers();
                    false
                }
                _ = timers.fleet.tick() => {
                    self.poll_fleet();
                    false
                }
                () = tick(&mut timers.reload) => {
                    tracing::info!("periodic page reload");
                    self.apply(Message::Reload);
                    true
                }
            };

            if reloaded {
                timers.reset();
                settle.as_mut().reset(Instant::now() + self.schedule.settle);
                settled = false;
            }
        }

        self.dashboard
    }
}
