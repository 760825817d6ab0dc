// PID controller with a clamped integral term

use crate::config::PidConfig;

/// PID controller with integral clamping and output limiting.
#[derive(Debug, Clone)]
pub struct PidController {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,
    /// Integral accumulator limit (symmetric)
    max_integral: f32,
    /// Output limit (symmetric)
    output_limit: f32,
    /// Integral accumulator
    integral: f32,
    /// Error of the previous update
    last_error: Option<f32>,
    /// Last calculated output
    last_output: f32,
}

impl PidController {
    /// Create a new PID controller
    ///
    /// # Arguments
    /// * `kp`, `ki`, `kd` - Gains
    /// * `max_integral` - Integral accumulator limit (±)
    /// * `output_limit` - Output limit (±)
    pub fn new(kp: f32, ki: f32, kd: f32, max_integral: f32, output_limit: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            max_integral,
            output_limit,
            integral: 0.0,
            last_error: None,
            last_output: 0.0,
        }
    }

    /// Create a controller from configuration.
    pub fn from_config(config: &PidConfig) -> Self {
        Self::new(
            config.kp,
            config.ki,
            config.kd,
            config.max_integral,
            config.max_step_rate_hz,
        )
    }

    /// Update the controller
    ///
    /// # Arguments
    /// * `error` - Setpoint minus measurement
    /// * `dt` - Time step, in the unit the gains were tuned for
    ///
    /// # Returns
    /// Controller output (limited to ±output_limit)
    pub fn update(&mut self, error: f32, dt: f32) -> f32 {
        let p_term = self.kp * error;

        self.integral = (self.integral + error * dt).clamp(-self.max_integral, self.max_integral);
        let i_term = self.ki * self.integral;

        // No derivative kick on the first update
        let d_term = match self.last_error {
            Some(last) if dt > 0.0 => self.kd * (error - last) / dt,
            _ => 0.0,
        };
        self.last_error = Some(error);

        self.last_output = (p_term + i_term + d_term).clamp(-self.output_limit, self.output_limit);
        self.last_output
    }

    /// Reset the integral and derivative memory
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
        self.last_output = 0.0;
    }

    /// Set the gains
    pub fn set_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Get the current output
    pub fn output(&self) -> f32 {
        self.last_output
    }

    /// Get the current integral accumulator
    pub fn integral(&self) -> f32 {
        self.integral
    }
}
