use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::repository::booking::BookingRepositoryImpl;
use adapter::repository::health::HealthCheckRepositoryImpl;
use adapter::repository::resource::ResourceRepositoryImpl;
use adapter::repository::slot::SlotRepositoryImpl;
use adapter::repository::user::UserRepositoryImpl;
use kernel::repository::booking::BookingRepository;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::resource::ResourceRepository;
use kernel::repository::slot::SlotRepository;
use kernel::repository::user::UserRepository;
use shared::clock::{Clock, SystemClock};

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    user_repository: Arc<dyn UserRepository>,
    resource_repository: Arc<dyn ResourceRepository>,
    slot_repository: Arc<dyn SlotRepository>,
    booking_repository: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let resource_repository = Arc::new(ResourceRepositoryImpl::new(pool.clone()));
        let slot_repository = Arc::new(SlotRepositoryImpl::new(pool.clone()));
        let booking_repository = Arc::new(BookingRepositoryImpl::new(pool.clone(), clock.clone()));
        Self {
            health_check_repository,
            user_repository,
            resource_repository,
            slot_repository,
            booking_repository,
            clock,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn resource_repository(&self) -> Arc<dyn ResourceRepository> {
        self.resource_repository.clone()
    }

    pub fn slot_repository(&self) -> Arc<dyn SlotRepository> {
        self.slot_repository.clone()
    }

    pub fn booking_repository(&self) -> Arc<dyn BookingRepository> {
        self.booking_repository.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }
}
