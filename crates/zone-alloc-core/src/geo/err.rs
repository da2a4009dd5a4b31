// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TooFewPointsError {
    distinct: usize,
}

impl TooFewPointsError {
    pub fn new(distinct: usize) -> Self {
        Self { distinct }
    }

    pub fn distinct(&self) -> usize {
        self.distinct
    }
}

impl std::fmt::Display for TooFewPointsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "A ring needs at least 3 distinct points, got {}",
            self.distinct
        )
    }
}

impl std::error::Error for TooFewPointsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NonFiniteCoordinateError {
    index: usize,
}

impl NonFiniteCoordinateError {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl std::fmt::Display for NonFiniteCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vertex {} has a non-finite coordinate", self.index)
    }
}

impl std::error::Error for NonFiniteCoordinateError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RingError {
    TooFewPoints(TooFewPointsError),
    NonFiniteCoordinate(NonFiniteCoordinateError),
}

impl std::fmt::Display for RingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RingError::TooFewPoints(e) => write!(f, "{}", e),
            RingError::NonFiniteCoordinate(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RingError {}

impl From<TooFewPointsError> for RingError {
    fn from(err: TooFewPointsError) -> Self {
        RingError::TooFewPoints(err)
    }
}

impl From<NonFiniteCoordinateError> for RingError {
    fn from(err: NonFiniteCoordinateError) -> Self {
        RingError::NonFiniteCoordinate(err)
    }
}
