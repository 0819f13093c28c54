//! Fixed editorial content for the public pages.
//!
//! Everything here ships with the binary: the marketing pages change with a
//! deploy, not through the admin screens. Only the product and service
//! catalogs are content-managed.

/// An entry on the blog page.
#[derive(Clone)]
pub struct BlogPost {
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: String,
    pub read_time: String,
    pub category: String,
}

/// The blog index entries, newest first.
#[must_use]
pub fn blog_posts() -> Vec<BlogPost> {
    vec![
        BlogPost {
            title: "10 Essential Elements of Modern Brand Identity".to_string(),
            excerpt: "Discover the key components that make modern brands stand out in today's competitive landscape.".to_string(),
            author: "Sarah Johnson".to_string(),
            date: "December 15, 2024".to_string(),
            read_time: "5 min read".to_string(),
            category: "Branding".to_string(),
        },
        BlogPost {
            title: "The Future of Video Marketing in 2025".to_string(),
            excerpt: "Explore emerging trends and technologies that will shape video marketing strategies in the coming year.".to_string(),
            author: "Michael Chen".to_string(),
            date: "December 10, 2024".to_string(),
            read_time: "7 min read".to_string(),
            category: "Video Marketing".to_string(),
        },
        BlogPost {
            title: "Custom Merchandise: More Than Just Products".to_string(),
            excerpt: "Learn how premium branded merchandise can become powerful brand ambassadors for your business.".to_string(),
            author: "Emily Rodriguez".to_string(),
            date: "December 5, 2024".to_string(),
            read_time: "4 min read".to_string(),
            category: "Merchandise".to_string(),
        },
        BlogPost {
            title: "Creating Authentic Brand Stories That Resonate".to_string(),
            excerpt: "Master the art of storytelling to build deeper connections with your audience and drive engagement.".to_string(),
            author: "David Kim".to_string(),
            date: "November 28, 2024".to_string(),
            read_time: "6 min read".to_string(),
            category: "Storytelling".to_string(),
        },
    ]
}

/// Whether a portfolio entry is stills or motion work.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PortfolioKind {
    Image,
    Video,
}

impl PortfolioKind {
    /// `true` for motion work; the cards badge these differently.
    #[must_use]
    pub const fn is_video(self) -> bool {
        matches!(self, Self::Video)
    }
}

/// A case study on the portfolio page.
#[derive(Clone)]
pub struct PortfolioItem {
    pub title: String,
    pub category: String,
    pub description: String,
    pub kind: PortfolioKind,
}

/// The portfolio case studies.
#[must_use]
pub fn portfolio_items() -> Vec<PortfolioItem> {
    vec![
        PortfolioItem {
            title: "BK Arena Branded Merchandise".to_string(),
            category: "Branded Products".to_string(),
            description: "Complete merchandise line for Rwanda's premier sports venue".to_string(),
            kind: PortfolioKind::Image,
        },
        PortfolioItem {
            title: "Heineken Campaign Video".to_string(),
            category: "Video Production".to_string(),
            description: "Creative campaign video for Heineken Rwanda launch".to_string(),
            kind: PortfolioKind::Video,
        },
        PortfolioItem {
            title: "RDB Corporate Identity".to_string(),
            category: "Brand Design".to_string(),
            description: "Logo design and brand guidelines for Rwanda Development Board".to_string(),
            kind: PortfolioKind::Image,
        },
        PortfolioItem {
            title: "Marriott Hotel Amenities".to_string(),
            category: "Branded Products".to_string(),
            description: "Luxury branded amenities for Marriott Hotel Kigali".to_string(),
            kind: PortfolioKind::Image,
        },
        PortfolioItem {
            title: "MTN Event Coverage".to_string(),
            category: "Event Video".to_string(),
            description: "Professional event coverage and highlights reel".to_string(),
            kind: PortfolioKind::Video,
        },
        PortfolioItem {
            title: "Canal+ Promotional Items".to_string(),
            category: "Branded Products".to_string(),
            description: "Custom promotional items for Canal+ subscription campaign".to_string(),
            kind: PortfolioKind::Image,
        },
        PortfolioItem {
            title: "RRA Annual Report Design".to_string(),
            category: "Print Design".to_string(),
            description: "Professional annual report design for Rwanda Revenue Authority".to_string(),
            kind: PortfolioKind::Image,
        },
        PortfolioItem {
            title: "Product Photography Showcase".to_string(),
            category: "Photography".to_string(),
            description: "Behind-the-scenes of our product photography process".to_string(),
            kind: PortfolioKind::Video,
        },
    ]
}

/// Portfolio filter chips in first-seen order. "All" is handled by the route.
#[must_use]
pub fn portfolio_categories() -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for item in portfolio_items() {
        if !categories.contains(&item.category) {
            categories.push(item.category);
        }
    }
    categories
}

/// A card in the "why choose us" grid.
#[derive(Clone)]
pub struct Reason {
    pub title: String,
    pub description: String,
}

/// The "why choose us" cards.
#[must_use]
pub fn reasons() -> Vec<Reason> {
    vec![
        Reason {
            title: "1000+ Satisfied Clients".to_string(),
            description: "Trusted by businesses across Rwanda and beyond".to_string(),
        },
        Reason {
            title: "Fast Production & Delivery".to_string(),
            description: "Quick turnaround times without compromising quality".to_string(),
        },
        Reason {
            title: "Affordable Bulk Pricing".to_string(),
            description: "Cost-effective solutions for all budget sizes".to_string(),
        },
        Reason {
            title: "In-House Creative Team".to_string(),
            description: "Passionate designers and strategists under one roof".to_string(),
        },
        Reason {
            title: "Kigali-Based, Africa-Wide Reach".to_string(),
            description: "Local expertise with continental impact".to_string(),
        },
    ]
}
