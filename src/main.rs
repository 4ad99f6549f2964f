//! Demo: a simulated visitor walking the garden map
//!
//! Feeds a scripted walk through the mock location source and prints every
//! event the tracker emits, plus the final cache statistics.

use gps_mapper::{
    GpsEvent, GpsTracker, MapperConfig, MockLocationSource, RawReading,
};

fn main() {
    let config = MapperConfig::default();
    println!(
        "mapper config:\n{}\n",
        serde_json::to_string_pretty(&config).expect("config serializes")
    );

    let source = MockLocationSource::new();
    let mut tracker = GpsTracker::new(Box::new(source.clone()), config);

    tracker.register_callback(Box::new(|event| match event {
        GpsEvent::PositionUpdate { position } => println!(
            "position: GPS({:.6}, {:.6}) -> local({:.1}, {:.1})",
            position.lat, position.lng, position.x, position.y
        ),
        GpsEvent::Error { message } => println!("error: {}", message),
        GpsEvent::TrackingStarted => println!("tracking started"),
        GpsEvent::TrackingStopped => println!("tracking stopped"),
    }));

    tracker.start_tracking().expect("mock platform is available");

    // Walk from the first marker toward the third, one reading per second
    let steps = 12;
    let (start_lat, start_lng) = (51.492060, 11.956057);
    let (end_lat, end_lng) = (51.490917, 11.956818);

    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        let lat = start_lat + (end_lat - start_lat) * t;
        let lng = start_lng + (end_lng - start_lng) * t;
        let now_ms = 1_000 + step as u64 * 1_000;

        source.push_reading(RawReading::new(lat, lng, now_ms).with_accuracy(8.0));
        tracker.process(now_ms);

        let nearby = tracker.nearby_markers();
        if !nearby.is_empty() {
            println!("  near: {}", nearby.join(", "));
        }
    }

    tracker.stop_tracking();

    let (hits, misses, hit_rate) = tracker.cache_statistics();
    println!(
        "\ntransform cache: {} hits, {} misses ({:.0}% hit rate)",
        hits,
        misses,
        hit_rate * 100.0
    );
}
