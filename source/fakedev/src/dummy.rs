use common::{config::VREF, units::AdcCode, values::ChannelId};
use env_logger::Env;
use rand::{thread_rng, Rng};
use std::time::Duration;
use tokio::{
    io::{stdin, AsyncBufReadExt, BufReader},
    main as async_main, select,
    time::interval,
};

/// Largest voltage change between two sensor updates.
const WALK_STEP: f32 = 0.01;
const WALK_PERIOD: Duration = Duration::from_millis(100);

#[async_main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut device = fakedev::start();
    let mut input = BufReader::new(stdin()).lines();
    let mut walk = interval(WALK_PERIOD);
    let mut voltages = [VREF / 4.0; 2];

    loop {
        select! {
            line = input.next_line() => match line {
                Ok(Some(line)) => device.send(&format!("{}\r", line)),
                Ok(None) => break,
                Err(e) => {
                    log::error!("Cannot read stdin: {}", e);
                    break;
                }
            },
            line = device.next_line() => match line {
                Some(line) => println!("{}", line.text),
                None => break,
            },
            _ = walk.tick() => {
                let mut rng = thread_rng();
                for (id, voltage) in ChannelId::ALL.into_iter().zip(voltages.iter_mut()) {
                    *voltage = (*voltage + rng.gen_range(-WALK_STEP..=WALK_STEP)).clamp(0.0, VREF);
                    device.set_adc(id, AdcCode::from_voltage_saturating(*voltage));
                }
            }
        }
    }

    println!("Statistics: {}", device.stats());
}
