//! Audio output: owns the demo player on the cpal callback thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use log::{error, info};
use rtrb::{Consumer, Producer};

use la32_dsp::MAX_BLOCK_SIZE;

use super::demo::{Demo, DemoPlayer};

/// Running output stream; audio stops when this is dropped.
pub struct Audio {
    _stream: cpal::Stream,
    pub sample_rate: f32,
}

/// Open the default output device and start rendering.
///
/// Every output frame goes to `scope_tx` as a left/right pair; demo
/// selections arrive on `demo_rx`. Neither side ever blocks the callback.
pub fn start(mut scope_tx: Producer<[f32; 2]>, mut demo_rx: Consumer<Demo>) -> EyreResult<Audio> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    info!("output: {sample_rate} Hz, {channels} channels");

    let mut player = DemoPlayer::new(sample_rate)?;
    let mut block = vec![0i16; MAX_BLOCK_SIZE * 2];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            while let Ok(demo) = demo_rx.pop() {
                player.select(demo);
            }

            for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                let frames = chunk.len() / channels;
                let stereo = &mut block[..frames * 2];
                player.render(stereo);

                for (frame, lr) in chunk.chunks_mut(channels).zip(stereo.chunks(2)) {
                    let left = lr[0] as f32 / 32768.0;
                    let right = lr[1] as f32 / 32768.0;
                    for (ch, out) in frame.iter_mut().enumerate() {
                        *out = if ch % 2 == 0 { left } else { right };
                    }
                    // A full scope queue just means the UI is behind.
                    let _ = scope_tx.push([left, right]);
                }
            }
        },
        |err| error!("audio stream error: {err}"),
        None,
    )?;

    stream.play()?;

    Ok(Audio {
        _stream: stream,
        sample_rate,
    })
}
