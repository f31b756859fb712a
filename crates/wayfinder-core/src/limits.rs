//! Input validation limits for node and edge data

/// Maximum length for node codes (64 chars)
pub const MAX_NODE_CODE_LEN: usize = 64;

/// Maximum length for node names and building names (256 chars)
pub const MAX_NODE_NAME_LEN: usize = 256;

/// Maximum nodes accepted in a single import (10000)
pub const MAX_IMPORT_NODES: usize = 10_000;

/// Maximum edges accepted in a single import (50000)
pub const MAX_IMPORT_EDGES: usize = 50_000;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyNodeCode,
    NodeCodeTooLong { len: usize, max: usize },
    NodeCodeWhitespace(String),
    EmptyNodeName,
    NodeNameTooLong { len: usize, max: usize },
    InvalidDistance(f64),
    InvalidCompassAngle(f64),
    SelfLoop(String),
    TooManyNodes { count: usize, max: usize },
    TooManyEdges { count: usize, max: usize },
    InvalidMetersPerFloor(f64),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNodeCode => write!(f, "Node code cannot be empty"),
            Self::NodeCodeTooLong { len, max } => {
                write!(f, "Node code too long: {} chars (max {})", len, max)
            }
            Self::NodeCodeWhitespace(code) => {
                write!(f, "Node code cannot contain whitespace: '{}'", code)
            }
            Self::EmptyNodeName => write!(f, "Node name cannot be empty"),
            Self::NodeNameTooLong { len, max } => {
                write!(f, "Node name too long: {} chars (max {})", len, max)
            }
            Self::InvalidDistance(d) => {
                write!(f, "Distance must be a finite, non-negative number: {}", d)
            }
            Self::InvalidCompassAngle(a) => {
                write!(f, "Compass angle must be finite and in [0, 360): {}", a)
            }
            Self::SelfLoop(code) => write!(f, "Edge cannot connect '{}' to itself", code),
            Self::TooManyNodes { count, max } => {
                write!(f, "Too many nodes in import: {} (max {})", count, max)
            }
            Self::TooManyEdges { count, max } => {
                write!(f, "Too many edges in import: {} (max {})", count, max)
            }
            Self::InvalidMetersPerFloor(m) => {
                write!(f, "Meters per floor must be finite and non-negative: {}", m)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate node code
pub fn validate_node_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::EmptyNodeCode);
    }
    if code.len() > MAX_NODE_CODE_LEN {
        return Err(ValidationError::NodeCodeTooLong {
            len: code.len(),
            max: MAX_NODE_CODE_LEN,
        });
    }
    if code.chars().any(char::is_whitespace) {
        return Err(ValidationError::NodeCodeWhitespace(code.to_string()));
    }
    Ok(())
}

/// Validate node display name (also used for building names)
pub fn validate_node_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyNodeName);
    }
    if name.len() > MAX_NODE_NAME_LEN {
        return Err(ValidationError::NodeNameTooLong {
            len: name.len(),
            max: MAX_NODE_NAME_LEN,
        });
    }
    Ok(())
}

/// Validate edge distance
pub fn validate_distance(distance: f64) -> Result<(), ValidationError> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(ValidationError::InvalidDistance(distance));
    }
    Ok(())
}

/// Validate compass angle
pub fn validate_compass_angle(angle: f64) -> Result<(), ValidationError> {
    if !angle.is_finite() || !(0.0..360.0).contains(&angle) {
        return Err(ValidationError::InvalidCompassAngle(angle));
    }
    Ok(())
}

/// Validate edge endpoints
pub fn validate_endpoints(from: &str, to: &str) -> Result<(), ValidationError> {
    if from == to {
        return Err(ValidationError::SelfLoop(from.to_string()));
    }
    Ok(())
}

/// Validate import batch sizes
pub fn validate_import(nodes: usize, edges: usize) -> Result<(), ValidationError> {
    if nodes > MAX_IMPORT_NODES {
        return Err(ValidationError::TooManyNodes {
            count: nodes,
            max: MAX_IMPORT_NODES,
        });
    }
    if edges > MAX_IMPORT_EDGES {
        return Err(ValidationError::TooManyEdges {
            count: edges,
            max: MAX_IMPORT_EDGES,
        });
    }
    Ok(())
}

/// Validate the vertical cost used by the floor heuristic
pub fn validate_meters_per_floor(meters: f64) -> Result<(), ValidationError> {
    if !meters.is_finite() || meters < 0.0 {
        return Err(ValidationError::InvalidMetersPerFloor(meters));
    }
    Ok(())
}
