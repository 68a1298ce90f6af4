// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
mod hex;

pub use hex::*;

/// Round `n` up to the next multiple of `m` (where `m > 0`).  A value
/// already on a boundary is left unchanged.
pub fn round_up(n: usize, m: usize) -> usize {
    ((n + m - 1) / m) * m
}
