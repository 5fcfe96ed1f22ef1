use std::time::Duration;

use async_graphql::{Context, Object, SimpleObject, Subscription};
use chrono::{DateTime, Utc};
use products_hr::checkin::{CheckInPanel, ClockTick};
use tokio_stream::{Stream, StreamExt as _, wrappers::IntervalStream};
use tracing::instrument;

use crate::graphql::session;

const TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, SimpleObject)]
pub struct CheckInPayload {
    pub checked_in: bool,
    pub since: Option<DateTime<Utc>>,
    /// `{h}h {m}m` since check-in.
    pub elapsed: Option<String>,
}

impl CheckInPayload {
    fn read(panel: &CheckInPanel, now: DateTime<Utc>) -> Self {
        Self {
            checked_in: panel.is_checked_in(),
            since: panel.checked_in_at(),
            elapsed: panel.elapsed(now),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct ClockTickPayload {
    pub now: DateTime<Utc>,
    pub elapsed: Option<String>,
}

impl From<ClockTick> for ClockTickPayload {
    fn from(tick: ClockTick) -> Self {
        Self {
            now: tick.now,
            elapsed: tick.elapsed,
        }
    }
}

#[derive(Default)]
pub struct CheckInQuery;

#[Object]
impl CheckInQuery {
    #[instrument(name = "graphql.check_in_status", skip_all)]
    async fn check_in(&self, ctx: &Context<'_>) -> async_graphql::Result<CheckInPayload> {
        let handle = session(ctx)?;
        let session = handle.lock().await;
        Ok(CheckInPayload::read(&session.check_in, Utc::now()))
    }
}

#[derive(Default)]
pub struct CheckInMutation;

#[Object]
impl CheckInMutation {
    #[instrument(name = "graphql.check_in", skip_all)]
    async fn check_in(&self, ctx: &Context<'_>) -> async_graphql::Result<CheckInPayload> {
        let handle = session(ctx)?;
        let mut session = handle.lock().await;
        let now = Utc::now();
        session.check_in.check_in(now);
        Ok(CheckInPayload::read(&session.check_in, now))
    }

    #[instrument(name = "graphql.check_out", skip_all)]
    async fn check_out(&self, ctx: &Context<'_>) -> async_graphql::Result<CheckInPayload> {
        let handle = session(ctx)?;
        let mut session = handle.lock().await;
        session.check_in.check_out();
        Ok(CheckInPayload::read(&session.check_in, Utc::now()))
    }
}

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Ticks once a second. Pass the `since` from `checkIn` to get the
    /// elapsed readout.
    async fn clock(
        &self,
        checked_in_at: Option<DateTime<Utc>>,
    ) -> impl Stream<Item = ClockTickPayload> {
        IntervalStream::new(tokio::time::interval(TICK))
            .map(move |_| ClockTick::at(Utc::now(), checked_in_at).into())
    }
}
