use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    sync::{Arc, Mutex, PoisonError},
};

use axum::{
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Caps how many requests a single source address may have in flight.
#[derive(Debug, Clone)]
pub struct ConnLimiter {
    max_per_ip: usize,
    active: Arc<Mutex<HashMap<IpAddr, usize>>>,
}

/// Releases its slot when dropped.
#[derive(Debug)]
pub struct ConnPermit {
    ip: IpAddr,
    active: Arc<Mutex<HashMap<IpAddr, usize>>>,
}

impl ConnLimiter {
    pub fn new(max_per_ip: usize) -> Self {
        Self {
            max_per_ip,
            active: Arc::default(),
        }
    }

    pub fn try_acquire(&self, ip: IpAddr) -> Option<ConnPermit> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let count = active.entry(ip).or_insert(0);
        if *count >= self.max_per_ip {
            return None;
        }
        *count += 1;

        Some(ConnPermit {
            ip,
            active: self.active.clone(),
        })
    }

    fn in_flight(&self, ip: IpAddr) -> usize {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.get(&ip).copied().unwrap_or(0)
    }
}

impl Drop for ConnPermit {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = active.get_mut(&self.ip) {
            *count -= 1;
            if *count == 0 {
                active.remove(&self.ip);
            }
        }
    }
}

pub async fn limit_per_ip<B>(
    State(limiter): State<ConnLimiter>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<B>,
    next: Next<B>,
) -> Response {
    let Some(_permit) = limiter.try_acquire(addr.ip()) else {
        tracing::warn!(
            "{addr} exceeded {} concurrent requests ({} in flight)",
            limiter.max_per_ip,
            limiter.in_flight(addr.ip())
        );
        return (StatusCode::TOO_MANY_REQUESTS, "too many concurrent requests").into_response();
    };

    next.run(request).await
}
