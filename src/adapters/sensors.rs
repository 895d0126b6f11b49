//! I2C sensor adapter: BH1750 ambient light and BMP280
//! temperature/pressure on the same bus.
//!
//! The BH1750 runs in continuous high-resolution mode; each sample is a
//! plain two-byte read. The BMP280 runs in normal mode with 1x
//! oversampling; raw values are compensated with the integer routines
//! from the vendor datasheet.

use anyhow::Context;
use rppal::i2c::I2c;

use crate::app::ports::SensorPort;
use crate::error::SensorError;

const BH1750_ADDR: u16 = 0x23;
/// Continuous high-resolution mode (1 lx, 120 ms integration).
const BH1750_CONT_HIRES: u8 = 0x10;

const BMP280_ADDR: u16 = 0x77;
const BMP280_REG_CALIB: u8 = 0x88;
const BMP280_REG_CTRL_MEAS: u8 = 0xF4;
const BMP280_REG_CONFIG: u8 = 0xF5;
const BMP280_REG_DATA: u8 = 0xF7;
/// osrs_t = x1, osrs_p = x1, normal mode.
const BMP280_CTRL_NORMAL: u8 = 0x27;
/// 1000 ms standby, no IIR filter.
const BMP280_CONFIG_STANDBY: u8 = 0xA0;

/// Trimming values read once from the BMP280 NVM.
#[derive(Debug, Clone, Copy)]
struct Bmp280Calibration {
    dig_t1: u16,
    dig_t2: i16,
    dig_t3: i16,
    dig_p1: u16,
    dig_p2: i16,
    dig_p3: i16,
    dig_p4: i16,
    dig_p5: i16,
    dig_p6: i16,
    dig_p7: i16,
    dig_p8: i16,
    dig_p9: i16,
}

impl Bmp280Calibration {
    fn parse(raw: &[u8; 24]) -> Self {
        let u = |i: usize| u16::from_le_bytes([raw[i], raw[i + 1]]);
        let s = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]);
        Self {
            dig_t1: u(0),
            dig_t2: s(2),
            dig_t3: s(4),
            dig_p1: u(6),
            dig_p2: s(8),
            dig_p3: s(10),
            dig_p4: s(12),
            dig_p5: s(14),
            dig_p6: s(16),
            dig_p7: s(18),
            dig_p8: s(20),
            dig_p9: s(22),
        }
    }
}

pub struct I2cSensors {
    i2c: I2c,
    calibration: Bmp280Calibration,
}

impl I2cSensors {
    /// Open the bus and configure both devices.
    pub fn new() -> anyhow::Result<Self> {
        let mut i2c = I2c::new().context("I2C bus open")?;

        i2c.set_slave_address(BH1750_ADDR).context("BH1750 address")?;
        i2c.write(&[BH1750_CONT_HIRES]).context("BH1750 mode set")?;

        i2c.set_slave_address(BMP280_ADDR).context("BMP280 address")?;
        let mut raw = [0u8; 24];
        i2c.write_read(&[BMP280_REG_CALIB], &mut raw)
            .context("BMP280 calibration read")?;
        i2c.write(&[BMP280_REG_CTRL_MEAS, BMP280_CTRL_NORMAL])
            .context("BMP280 ctrl_meas")?;
        i2c.write(&[BMP280_REG_CONFIG, BMP280_CONFIG_STANDBY])
            .context("BMP280 config")?;

        Ok(Self {
            i2c,
            calibration: Bmp280Calibration::parse(&raw),
        })
    }
}

impl SensorPort for I2cSensors {
    fn read_lux(&mut self) -> Result<f32, SensorError> {
        self.i2c
            .set_slave_address(BH1750_ADDR)
            .map_err(|_| SensorError::BusError)?;
        let mut raw = [0u8; 2];
        self.i2c.read(&mut raw).map_err(|_| SensorError::BusError)?;
        Ok(f32::from(u16::from_be_bytes(raw)) / 1.2)
    }

    fn read_temperature_pressure(&mut self) -> Result<(f32, f32), SensorError> {
        self.i2c
            .set_slave_address(BMP280_ADDR)
            .map_err(|_| SensorError::BusError)?;
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(&[BMP280_REG_DATA], &mut raw)
            .map_err(|_| SensorError::BusError)?;

        let adc_p =
            (i32::from(raw[0]) << 12) | (i32::from(raw[1]) << 4) | (i32::from(raw[2]) >> 4);
        let adc_t =
            (i32::from(raw[3]) << 12) | (i32::from(raw[4]) << 4) | (i32::from(raw[5]) >> 4);
        // All-ones ADC values mean the measurement isn't ready.
        if adc_t == 0x80000 || adc_p == 0x80000 {
            return Err(SensorError::BadResponse);
        }

        let (temperature, t_fine) = compensate_temperature(adc_t, &self.calibration);
        let pressure = compensate_pressure(adc_p, t_fine, &self.calibration)?;
        if !(-45.0..=90.0).contains(&temperature) {
            return Err(SensorError::OutOfRange);
        }
        Ok((temperature, pressure))
    }
}

/// Datasheet §3.11.3 integer temperature compensation. Returns
/// `(°C, t_fine)`; `t_fine` feeds the pressure routine.
fn compensate_temperature(adc_t: i32, c: &Bmp280Calibration) -> (f32, i32) {
    let var1 = (((adc_t >> 3) - (i32::from(c.dig_t1) << 1)) * i32::from(c.dig_t2)) >> 11;
    let var2 = (((((adc_t >> 4) - i32::from(c.dig_t1)) * ((adc_t >> 4) - i32::from(c.dig_t1)))
        >> 12)
        * i32::from(c.dig_t3))
        >> 14;
    let t_fine = var1 + var2;
    let centi = (t_fine * 5 + 128) >> 8;
    (centi as f32 / 100.0, t_fine)
}

/// Datasheet §3.11.3 64-bit pressure compensation. Returns hPa.
fn compensate_pressure(
    adc_p: i32,
    t_fine: i32,
    c: &Bmp280Calibration,
) -> Result<f32, SensorError> {
    let mut var1 = i64::from(t_fine) - 128_000;
    let mut var2 = var1 * var1 * i64::from(c.dig_p6);
    var2 += (var1 * i64::from(c.dig_p5)) << 17;
    var2 += i64::from(c.dig_p4) << 35;
    var1 = ((var1 * var1 * i64::from(c.dig_p3)) >> 8) + ((var1 * i64::from(c.dig_p2)) << 12);
    var1 = (((1i64 << 47) + var1) * i64::from(c.dig_p1)) >> 33;
    if var1 == 0 {
        return Err(SensorError::BadResponse);
    }
    let mut p = 1_048_576 - i64::from(adc_p);
    p = (((p << 31) - var2) * 3125) / var1;
    var1 = (i64::from(c.dig_p9) * (p >> 13) * (p >> 13)) >> 25;
    var2 = (i64::from(c.dig_p8) * p) >> 19;
    p = ((p + var1 + var2) >> 8) + (i64::from(c.dig_p7) << 4);
    // p is Pa in Q24.8 fixed point.
    Ok(p as f32 / 256.0 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Trimming values and expected results from the BMP280 datasheet's
    /// worked example (§3.12).
    fn datasheet_calibration() -> Bmp280Calibration {
        Bmp280Calibration {
            dig_t1: 27504,
            dig_t2: 26435,
            dig_t3: -1000,
            dig_p1: 36477,
            dig_p2: -10685,
            dig_p3: 3024,
            dig_p4: 2855,
            dig_p5: 140,
            dig_p6: -7,
            dig_p7: 15500,
            dig_p8: -14600,
            dig_p9: 6000,
        }
    }

    #[test]
    fn temperature_matches_datasheet_example() {
        let (t, t_fine) = compensate_temperature(519_888, &datasheet_calibration());
        assert!((t - 25.08).abs() < 0.01, "got {t}");
        assert_eq!(t_fine, 128_422);
    }

    #[test]
    fn pressure_matches_datasheet_example() {
        let c = datasheet_calibration();
        let (_, t_fine) = compensate_temperature(519_888, &c);
        let p = compensate_pressure(415_148, t_fine, &c).unwrap();
        // Expected 100653.27 Pa = 1006.53 hPa.
        assert!((p - 1006.53).abs() < 0.05, "got {p}");
    }

    #[test]
    fn calibration_parses_little_endian() {
        let mut raw = [0u8; 24];
        raw[0] = 0x70; // dig_t1 = 0x6B70 = 27504
        raw[1] = 0x6B;
        raw[2] = 0x43; // dig_t2 = 0x6743 = 26435
        raw[3] = 0x67;
        let c = Bmp280Calibration::parse(&raw);
        assert_eq!(c.dig_t1, 27504);
        assert_eq!(c.dig_t2, 26435);
    }
}
