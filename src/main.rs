// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{debug, error, info, trace, warn};
use zenoh::prelude::r#async::*;

use rslidarpub::{
    args::Args,
    msg,
    packet_source::{PacketSource, UdpSource},
    CalibrationStore, Decoder, Points,
};

/// Points accumulated per revolution before publication; sized for a
/// full dual-echo turn with headroom.
const FRAME_CAPACITY: usize = 300_000;

/// Temperature telemetry cadence.
const TEMPERATURE_PERIOD: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.rust_log)
        .init();

    let tables = args.raw_tables()?;
    let store = Arc::new(CalibrationStore::load(tables, args.decoder_config())?);
    if args.calibration.is_none() {
        warn!("no calibration file given, decoding with flat tables");
    }

    let session = zenoh::open(zenoh::config::Config::from(args.clone()))
        .res_async()
        .await?
        .into_arc();
    debug!("opened zenoh session");

    let cloud_topic = format!("{}/points", args.lidar_topic);
    let publisher = match session
        .declare_publisher(cloud_topic.clone())
        .priority(Priority::DataHigh)
        .congestion_control(CongestionControl::Drop)
        .res_async()
        .await
    {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to create publisher {}: {:?}", cloud_topic, e);
            return Err(e);
        }
    };

    let temperature_topic = format!("{}/temperature", args.lidar_topic);
    let temperature_publisher = match session
        .declare_publisher(temperature_topic.clone())
        .priority(Priority::Background)
        .congestion_control(CongestionControl::Drop)
        .res_async()
        .await
    {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to create publisher {}: {:?}", temperature_topic, e);
            return Err(e);
        }
    };

    let mut source = UdpSource::bind(&args.bind).await?;
    info!("listening for MSOP packets on {}", args.bind);

    let mut decoder = Decoder::new(store);
    let mut cloud = Points::with_capacity(FRAME_CAPACITY);
    let mut buf = [0u8; 2048];
    let mut last_rotation: Option<u16> = None;
    let mut last_temperature = Instant::now();

    loop {
        let len = source.recv(&mut buf).await?;
        let summary = match decoder.decode(&buf[..len], &mut cloud) {
            Ok(summary) => summary,
            Err(e) => {
                warn!("dropping packet: {e}");
                continue;
            }
        };

        // The frame is complete when the rotation code wraps past zero.
        let wrapped = last_rotation.is_some_and(|prev| summary.rotation < prev);
        last_rotation = Some(summary.rotation);

        if wrapped && !cloud.is_empty() {
            let stamp = timestamp()?;
            let cloud_msg = msg::pointcloud2(&args.frame_id, stamp, &cloud);
            let encoded = cdr::serialize::<_, _, cdr::CdrLe>(&cloud_msg, cdr::Infinite)?;
            let encoded = Value::from(encoded).encoding(Encoding::WithSuffix(
                KnownEncoding::AppOctetStream,
                "sensor_msgs/msg/PointCloud2".into(),
            ));

            match publisher.put(encoded).res_async().await {
                Ok(_) => trace!("{} points sent on {}", cloud.len(), cloud_topic),
                Err(e) => error!("{} message error: {:?}", cloud_topic, e),
            }
            cloud.clear();
        }

        if last_temperature.elapsed() >= TEMPERATURE_PERIOD {
            last_temperature = Instant::now();
            let temperature_msg = msg::Float32 {
                data: summary.temperature,
            };
            let encoded = cdr::serialize::<_, _, cdr::CdrLe>(&temperature_msg, cdr::Infinite)?;
            let encoded = Value::from(encoded).encoding(Encoding::WithSuffix(
                KnownEncoding::AppOctetStream,
                "std_msgs/msg/Float32".into(),
            ));

            match temperature_publisher.put(encoded).res_async().await {
                Ok(_) => trace!("temperature {:.1} sent", summary.temperature),
                Err(e) => error!("{} message error: {:?}", temperature_topic, e),
            }
        }
    }
}

/// Current time as a ROS2 stamp.
///
/// On Linux, uses `CLOCK_MONOTONIC_RAW` for best accuracy.
#[cfg(target_os = "linux")]
fn timestamp() -> Result<msg::Time, std::io::Error> {
    let mut tp = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let err = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut tp) };
    if err != 0 {
        return Err(std::io::Error::last_os_error());
    }

    Ok(msg::Time {
        sec: tp.tv_sec as i32,
        nanosec: tp.tv_nsec as u32,
    })
}

#[cfg(not(target_os = "linux"))]
fn timestamp() -> Result<msg::Time, std::io::Error> {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    Ok(msg::Time {
        sec: duration.as_secs() as i32,
        nanosec: duration.subsec_nanos(),
    })
}
