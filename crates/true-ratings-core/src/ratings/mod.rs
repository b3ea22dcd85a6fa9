// Current-season True Ratings: skill scales, percentile ranking, prospect
// translation, the rating pass.

pub mod percentile;
pub mod prospect;
pub mod skills;
pub mod true_rating;
