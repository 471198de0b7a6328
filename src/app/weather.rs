use crate::event::AppEvent;
use crate::weather::WeatherTrigger;

use super::App;

impl App {
    pub fn request_weather_sync(&mut self, trigger: WeatherTrigger) {
        let Some(ticket) = self.weather.begin_sync(trigger) else {
            return;
        };
        let api = self.api.clone();
        self.spawn_task(async move {
            AppEvent::WeatherFetched {
                ticket,
                result: api.weather().await,
            }
        });
    }

    pub(super) fn run_weather_timer(&mut self, now: u64) {
        if now.saturating_sub(self.timers.last_weather_ms) >= self.config.weather.refresh_interval_ms {
            self.timers.last_weather_ms = now;
            self.request_weather_sync(WeatherTrigger::Interval);
        }
    }
}
