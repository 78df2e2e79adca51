use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEARNING_KEYWORDS: Regex = Regex::new(r"learn|study|understand|master").unwrap();
    static ref CREATION_KEYWORDS: Regex =
        Regex::new(r"create|build|make|develop|design").unwrap();
    static ref IMPROVEMENT_KEYWORDS: Regex =
        Regex::new(r"improve|better|enhance|optimize|upgrade").unwrap();
}

/// Which canned workflow a goal falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    Learning,
    Creation,
    Improvement,
    General,
}

impl FallbackKind {
    /// Keyword sets are checked in priority order; the first hit wins.
    /// Keywords match anywhere in the goal, so "studying" counts as "study".
    pub fn classify(goal: &str) -> Self {
        let goal = goal.to_lowercase();
        if LEARNING_KEYWORDS.is_match(&goal) {
            FallbackKind::Learning
        } else if CREATION_KEYWORDS.is_match(&goal) {
            FallbackKind::Creation
        } else if IMPROVEMENT_KEYWORDS.is_match(&goal) {
            FallbackKind::Improvement
        } else {
            FallbackKind::General
        }
    }

    pub fn render(self, goal: &str) -> String {
        match self {
            FallbackKind::Learning => learning_template(goal),
            FallbackKind::Creation => creation_template(goal),
            FallbackKind::Improvement => improvement_template(goal),
            FallbackKind::General => general_template(goal),
        }
    }
}

/// Canned workflow used when the model is out of quota.
pub fn select_fallback(goal: &str) -> String {
    FallbackKind::classify(goal).render(goal)
}

fn learning_template(goal: &str) -> String {
    format!(
        "# Learning Workflow: {goal}

## Step 1: Define Your Learning Goals
- Clearly outline what you want to achieve
- Set specific, measurable objectives
- Determine your timeline

## Step 2: Research and Gather Resources
- Find reputable learning materials (books, courses, tutorials)
- Identify online platforms and communities
- Create a resource library

## Step 3: Create a Study Schedule
- Break down the topic into manageable chunks
- Allocate daily/weekly study time
- Set milestones and deadlines

## Step 4: Start with Fundamentals
- Begin with basic concepts
- Build a strong foundation
- Practice regularly

## Step 5: Apply Your Knowledge
- Work on practical projects
- Join communities or study groups
- Seek feedback and mentorship

## Step 6: Review and Iterate
- Regularly assess your progress
- Adjust your approach as needed
- Celebrate achievements and learn from setbacks
"
    )
}

fn creation_template(goal: &str) -> String {
    format!(
        "# Creation Workflow: {goal}

## Step 1: Planning and Research
- Define your project scope and objectives
- Research similar projects and best practices
- Gather inspiration and references

## Step 2: Design and Conceptualize
- Create initial sketches or wireframes
- Plan the structure and flow
- Consider user experience and functionality

## Step 3: Prepare Resources and Tools
- Identify required tools and software
- Gather necessary materials or assets
- Set up your workspace

## Step 4: Development/Creation Phase
- Start with a minimum viable version
- Work in iterative cycles
- Test and refine regularly

## Step 5: Review and Polish
- Get feedback from others
- Make improvements and refinements
- Ensure quality and completeness

## Step 6: Launch and Share
- Prepare for release or presentation
- Share with your target audience
- Gather feedback for future improvements
"
    )
}

fn improvement_template(goal: &str) -> String {
    format!(
        "# Improvement Workflow: {goal}

## Step 1: Current State Assessment
- Analyze the current situation
- Identify specific areas needing improvement
- Gather baseline metrics

## Step 2: Set Clear Improvement Goals
- Define what success looks like
- Set measurable targets
- Establish timeline for improvements

## Step 3: Research Best Practices
- Study successful examples
- Learn from experts in the field
- Identify proven strategies

## Step 4: Create Action Plan
- Break down improvements into steps
- Prioritize high-impact changes
- Allocate resources and time

## Step 5: Implement Changes
- Start with small, manageable changes
- Monitor progress regularly
- Adjust approach based on results

## Step 6: Measure and Optimize
- Track key metrics
- Celebrate improvements
- Continue iterating for better results
"
    )
}

fn general_template(goal: &str) -> String {
    format!(
        "# Workflow: {goal}

## Step 1: Define and Plan
- Clearly define what you want to achieve
- Break down the goal into smaller tasks
- Create a timeline and action plan

## Step 2: Gather Resources
- Identify what you need to succeed
- Collect necessary tools, information, or materials
- Prepare your workspace or environment

## Step 3: Take Action
- Start with the first concrete step
- Maintain consistent progress
- Track your advancement

## Step 4: Monitor and Adjust
- Regularly review your progress
- Make adjustments as needed
- Stay flexible and adapt to challenges

## Step 5: Complete and Evaluate
- Finish the planned tasks
- Evaluate the results
- Learn from the experience for future goals

*Note: This is a general workflow. For more specific guidance, please try again later when our AI service is available.*
"
    )
}
