//! Shared test utilities for maxtab.
//!
//! This module provides common setup functions and a scripted host used
//! across test modules.

#![cfg(test)]

use crate::config::{ConfigAccessor, Configuration, SettingsStore, SqliteSettingsStore};
use crate::db::{migrations, Database};
use crate::error::HostError;
use crate::host::{HostApi, Tab, TabQuery, TabUpdate, Window, WindowState, WindowType, WindowUpdate};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// Config accessor over an empty settings table.
pub fn setup_test_config() -> (ConfigAccessor, TempDir) {
    let (db, dir) = setup_test_db();
    let store = SqliteSettingsStore::new(Arc::new(Mutex::new(db)));
    (ConfigAccessor::new(Arc::new(store)), dir)
}

/// Config accessor whose store already holds `config`, written without
/// validation so tests can plant malformed patterns.
pub async fn setup_test_config_with(config: &Configuration) -> (ConfigAccessor, TempDir) {
    let (db, dir) = setup_test_db();
    let store = SqliteSettingsStore::new(Arc::new(Mutex::new(db)));
    store
        .set(config.to_stored())
        .await
        .expect("Failed to seed test settings");
    (ConfigAccessor::new(Arc::new(store)), dir)
}

/// Tab snapshot without a URL.
pub fn tab(id: i64, active: bool, last_accessed: Option<f64>) -> Tab {
    Tab { id: Some(id), url: None, active, last_accessed }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    QueryTabs(i64),
    UpdateTab(i64),
    UpdateWindow(i64),
    GetLastFocusedWindow,
}

#[derive(Default)]
struct FakeHostState {
    tabs: HashMap<i64, Vec<Tab>>,
    focused: Option<i64>,
    failing_tabs: HashMap<i64, String>,
    failing_windows: HashMap<i64, String>,
    calls: Vec<HostCall>,
}

/// In-memory host with scripted windows, tabs and failures. Activating a tab
/// makes it the only active tab of its window.
#[derive(Default)]
pub struct FakeHost {
    state: Mutex<FakeHostState>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tabs(&self, window_id: i64, tabs: Vec<Tab>) {
        self.state.lock().unwrap().tabs.insert(window_id, tabs);
    }

    pub fn focus_window(&self, window_id: i64) {
        self.state.lock().unwrap().focused = Some(window_id);
    }

    pub fn fail_tab(&self, tab_id: i64, message: &str) {
        self.state.lock().unwrap().failing_tabs.insert(tab_id, message.to_string());
    }

    pub fn fail_window(&self, window_id: i64, message: &str) {
        self.state.lock().unwrap().failing_windows.insert(window_id, message.to_string());
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Tab ids passed to `update_tab`, in call order.
    pub fn tab_updates(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::UpdateTab(id) => Some(id),
                HostCall::QueryTabs(_) | HostCall::UpdateWindow(_) | HostCall::GetLastFocusedWindow => None,
            })
            .collect()
    }

    /// Window ids passed to `update_window`, in call order.
    pub fn window_updates(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::UpdateWindow(id) => Some(id),
                HostCall::QueryTabs(_) | HostCall::UpdateTab(_) | HostCall::GetLastFocusedWindow => None,
            })
            .collect()
    }
}

#[async_trait]
impl HostApi for FakeHost {
    async fn query_tabs(&self, query: TabQuery) -> Vec<Tab> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::QueryTabs(query.window_id));
        state.tabs.get(&query.window_id).cloned().unwrap_or_default()
    }

    async fn update_tab(&self, tab_id: i64, update: TabUpdate) -> Result<Option<Tab>, HostError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::UpdateTab(tab_id));
        if let Some(message) = state.failing_tabs.get(&tab_id) {
            return Err(HostError::new(message.clone()));
        }

        let window_tabs = state
            .tabs
            .values_mut()
            .find(|tabs| tabs.iter().any(|t| t.id == Some(tab_id)))
            .ok_or_else(|| HostError::new(format!("No tab with id: {tab_id}.")))?;

        if update.active {
            for t in window_tabs.iter_mut() {
                t.active = t.id == Some(tab_id);
            }
        }
        Ok(window_tabs.iter().find(|t| t.id == Some(tab_id)).cloned())
    }

    async fn update_window(&self, window_id: i64, update: WindowUpdate) -> Result<Option<Window>, HostError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::UpdateWindow(window_id));
        if let Some(message) = state.failing_windows.get(&window_id) {
            return Err(HostError::new(message.clone()));
        }
        Ok(Some(Window {
            id: Some(window_id),
            window_type: Some(WindowType::Normal),
            state: Some(update.state),
        }))
    }

    async fn get_last_focused_window(&self) -> Result<Window, HostError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::GetLastFocusedWindow);
        state
            .focused
            .map(|id| Window {
                id: Some(id),
                window_type: Some(WindowType::Normal),
                state: Some(WindowState::Normal),
            })
            .ok_or_else(|| HostError::new("No last-focused window"))
    }
}
